//! Named, stacked, timed modifiers attached to units.

use crate::unit::UnitId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuffId(pub u32);

#[derive(Clone, Debug)]
pub struct Buff {
    /// Identity of this application; refreshed on restack so stale expiry
    /// timers miss.
    pub id: BuffId,
    pub name: String,
    pub source: UnitId,
    pub target: UnitId,
    pub stacks: u8,
    pub duration: f32,
    /// Network slot on the target unit.
    pub slot: u8,
    /// HUD-only visual: replicated, carries no gameplay modifiers.
    pub hud_only: bool,
}
