//! Blink: instant short-range teleport toward the cast point, clamped to
//! the level's range.

use glam::Vec2;

use crate::effects::Effects;
use crate::script::AbilityScript;
use crate::spell::SpellInfo;
use crate::unit::UnitId;

#[derive(Debug, Default, Clone, Copy)]
pub struct Blink;

const FLASH_S: f32 = 1.0;

pub fn destination(from: Vec2, to: Vec2, range: f32) -> Vec2 {
    let d = to - from;
    if d.length() <= range { to } else { from + d.normalize_or_zero() * range }
}

impl AbilityScript for Blink {
    fn on_finish_casting(&mut self, fx: &mut Effects<'_>, spell: &SpellInfo, _target: Option<UnitId>) {
        let Some(from) = fx.position_of(spell.owner) else { return };
        let dest = destination(from, spell.target_pos, spell.data.cast_range(spell.level));
        fx.add_particle(spell.owner, "Blink_flash.troy", from, 1.0, "", Some(FLASH_S));
        match fx.teleport_to(spell.owner, dest) {
            Ok(p) => log::debug!("blink {:?} -> {:?}", spell.owner, p),
            Err(e) => log::warn!("blink: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_range() {
        let d = destination(Vec2::ZERO, Vec2::new(1000.0, 0.0), 475.0);
        assert!((d.x - 475.0).abs() < 1e-3 && d.y.abs() < 1e-6);
        assert_eq!(destination(Vec2::ZERO, Vec2::new(10.0, 0.0), 475.0), Vec2::new(10.0, 0.0));
    }
}
