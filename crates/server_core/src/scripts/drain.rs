//! Drain: channeled tether on a unit. A persistent laser hits the target
//! while the channel lasts; each hit damages it, heals the caster and marks
//! the target with a debuff for the channel's length.

use crate::effects::Effects;
use crate::objects::Projectile;
use crate::script::AbilityScript;
use crate::spell::SpellInfo;
use crate::unit::UnitId;

#[derive(Debug, Default, Clone)]
pub struct Drain {
    /// Hits landed since activation.
    pub hits: u32,
}

impl Drain {
    pub fn damage(level: u8) -> i32 {
        40 + 20 * i32::from(level)
    }
}

impl AbilityScript for Drain {
    fn on_finish_casting(&mut self, fx: &mut Effects<'_>, spell: &SpellInfo, target: Option<UnitId>) {
        let Some(t) = target else {
            log::debug!("drain: no unit target");
            return;
        };
        let Some(to) = fx.position_of(t) else { return };
        let _ = fx.spell_animation(spell.owner, "Spell4");
        if let Err(e) = fx.add_laser(spell, to, false) {
            log::warn!("drain: {e}");
        }
    }

    fn apply_effects(&mut self, fx: &mut Effects<'_>, spell: &SpellInfo, target: UnitId, _p: Option<&Projectile>) {
        self.hits += 1;
        let dmg = Self::damage(spell.level);
        let _ = fx.deal_damage(spell.owner, target, dmg);
        let _ = fx.deal_damage(spell.owner, spell.owner, -dmg / 2);
        let channel = spell.data.channel_duration(spell.level);
        let _ = fx.add_buff("Drained", channel, 1, target, spell.owner);
    }
}
