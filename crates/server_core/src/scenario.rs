//! Builds a `ServerState` from a data-driven scenario and replays its
//! command timeline.

use anyhow::{Context, Result, anyhow};
use data_runtime::configs::server::ServerCfg;
use data_runtime::scenario::{Command, Scenario};
use data_runtime::specdb::SpecDb;
use glam::Vec2;
use std::sync::Arc;

use crate::script::ScriptRegistry;
use crate::state::ServerState;
use crate::unit::{Team, Unit, UnitId, UnitKind};

pub fn build(scn: &Scenario, cfg: ServerCfg, content: Arc<SpecDb>, scripts: ScriptRegistry) -> Result<ServerState> {
    let mut state = ServerState::new(cfg, content, scripts);
    for u in &scn.units {
        let kind = UnitKind::parse(&u.kind).ok_or_else(|| anyhow!("unit {}: unknown kind '{}'", u.id, u.kind))?;
        let id = UnitId(u.id);
        state.spawn_unit(Unit::new(id, kind, Team::from_index(u.team), Vec2::from(u.pos), u.hp));
        for (slot, name) in u.spells.iter().enumerate() {
            let slot = u8::try_from(slot).with_context(|| format!("unit {}: too many spells", u.id))?;
            state
                .add_spell(id, slot, name)
                .with_context(|| format!("unit {} slot {}", u.id, slot))?;
        }
    }
    log::info!("scenario '{}': {} units", scn.name, scn.units.len());
    Ok(state)
}

/// Issue one timeline command. Cast rejections are gameplay outcomes, not
/// errors; they come back as `Ok(false)`.
pub fn apply(state: &mut ServerState, cmd: &Command) -> Result<bool> {
    match cmd {
        Command::Cast { unit, slot, pos, target, .. } => {
            match state.cast(UnitId(*unit), *slot, Vec2::from(*pos), target.map(UnitId)) {
                Ok(()) => Ok(true),
                Err(e) => {
                    log::info!("unit {unit} slot {slot}: {e}");
                    Ok(false)
                }
            }
        }
        Command::LevelUp { unit, slot, .. } => {
            state.level_up(UnitId(*unit), *slot)?;
            Ok(true)
        }
        Command::SetCooldown { unit, slot, value, .. } => {
            state.set_cooldown(UnitId(*unit), *slot, *value)?;
            Ok(true)
        }
    }
}

/// Run `ticks` steps of `tick_ms`, issuing each command at the start of its
/// tick. Returns the number of accepted commands.
pub fn run(state: &mut ServerState, scn: &Scenario, ticks: u32, tick_ms: f32) -> Result<usize> {
    let mut cmds: Vec<&Command> = scn.commands.iter().collect();
    cmds.sort_by_key(|c| c.at_tick());
    let mut next = 0;
    let mut accepted = 0;
    for tick in 0..ticks {
        while let Some(c) = cmds.get(next)
            && c.at_tick() == tick
        {
            if apply(state, c)? {
                accepted += 1;
            }
            next += 1;
        }
        state.step_authoritative(tick_ms);
    }
    Ok(accepted)
}
