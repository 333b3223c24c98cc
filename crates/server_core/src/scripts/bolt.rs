//! Bolt: skillshot missile toward the cast point; damages the first hostile
//! unit it touches.

use crate::effects::Effects;
use crate::objects::Projectile;
use crate::script::AbilityScript;
use crate::spell::SpellInfo;
use crate::unit::UnitId;

pub const MISSILE: &str = "BoltMissile";

#[derive(Debug, Default, Clone, Copy)]
pub struct Bolt;

impl Bolt {
    pub fn damage(level: u8) -> i32 {
        60 + 30 * i32::from(level)
    }
}

impl AbilityScript for Bolt {
    fn on_start_casting(&mut self, fx: &mut Effects<'_>, spell: &SpellInfo, _target: Option<UnitId>) {
        let Some(from) = fx.position_of(spell.owner) else { return };
        let _ = fx.face_direction(spell.owner, spell.target_pos - from, false, 0.08);
    }

    fn on_finish_casting(&mut self, fx: &mut Effects<'_>, spell: &SpellInfo, _target: Option<UnitId>) {
        let _ = fx.spell_animation(spell.owner, "Spell1");
        if let Err(e) = fx.add_projectile(spell, MISSILE, spell.target_pos, false) {
            log::warn!("bolt: {e}");
        }
    }

    fn apply_effects(&mut self, fx: &mut Effects<'_>, spell: &SpellInfo, target: UnitId, _p: Option<&Projectile>) {
        let _ = fx.deal_damage(spell.owner, target, Self::damage(spell.level));
    }
}
