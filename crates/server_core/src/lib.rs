//! `server_core`: authoritative ability pipeline.
//!
//! Scope
//! - Spell state machine (`spell`) with name-resolved scripts (`script`, `scripts`)
//! - Effect Facade (`effects`): the only mutation path for replicated gameplay state
//! - Timer scheduler with tick-boundary staging (`timers`)
//! - World container, units and hazards (`world`, `unit`, `objects`, `systems`)
//! - Fixed-step tick loop and command layer (`state`)
//!
//! Everything runs on the simulation thread. Replication goes out through a
//! `net_core::transport::Transport` after each step.

pub mod buff;
pub mod combat;
pub mod effects;
pub mod error;
pub mod nav;
pub mod objects;
pub mod scenario;
pub mod script;
pub mod scripts;
pub mod spell;
pub mod state;
pub mod systems;
pub mod telemetry;
pub mod timers;
pub mod unit;
pub mod world;

pub use effects::{DashParams, Effects, Outbound, Outbox};
pub use error::{CastRejected, EffectError, SpellError};
pub use script::{AbilityScript, NoopScript, ScriptRegistry};
pub use spell::{Spell, SpellInfo, SpellState};
pub use state::ServerState;
pub use unit::{Team, Unit, UnitId, UnitKind};
