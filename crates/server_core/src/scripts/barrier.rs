//! Barrier: instant self shield with a timed visual.

use crate::effects::Effects;
use crate::script::AbilityScript;
use crate::spell::SpellInfo;
use crate::unit::UnitId;

pub const DURATION_S: f32 = 2.5;

#[derive(Debug, Default, Clone, Copy)]
pub struct Barrier;

impl AbilityScript for Barrier {
    fn on_finish_casting(&mut self, fx: &mut Effects<'_>, spell: &SpellInfo, _target: Option<UnitId>) {
        let owner = spell.owner;
        if let Err(e) = fx.add_buff("Barrier", DURATION_S, 1, owner, owner) {
            log::warn!("barrier: {e}");
            return;
        }
        if let Err(e) = fx.add_particle_target(owner, "Barrier_buf.troy", owner, 1.0, "chest", Some(DURATION_S)) {
            log::warn!("barrier visual: {e}");
        }
    }
}
