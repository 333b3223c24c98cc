//! Ability balance data. Immutable once loaded; level-indexed tables cover
//! levels `0..=MAX_SPELL_LEVEL`.

use serde::Deserialize;

use crate::ids::hash_name;

/// Highest level an ability can reach.
pub const MAX_SPELL_LEVEL: u8 = 5;

/// Ability flag bits carried in [`SpellData::flags`].
pub mod flags {
    /// Cast completes immediately regardless of `cast_time_s`.
    pub const INSTANT_CAST: u32 = 0x0000_0001;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Targeting {
    #[default]
    #[serde(rename = "self")]
    SelfCast,
    Unit,
    Point,
    Area,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpellData {
    pub name: String,
    /// Explicit identity assigned by content; falls back to the name hash.
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub targeting: Targeting,

    // Cast/channel/cd
    #[serde(default)]
    pub cast_time_s: f32,
    #[serde(default)]
    pub cooldown_s: Vec<f32>,
    #[serde(default)]
    pub channel_duration_s: Vec<f32>,
    #[serde(default)]
    pub mana_cost: Vec<f32>,
    #[serde(default)]
    pub cast_range: Vec<f32>,
    #[serde(default)]
    pub flags: u32,

    // Missiles
    #[serde(default)]
    pub missile_speed: f32,
    #[serde(default)]
    pub line_width: f32,

    /// Visual spawned on every unit hit by this ability.
    #[serde(default)]
    pub hit_effect: Option<String>,
}

#[inline]
fn at_level(table: &[f32], level: u8) -> f32 {
    if table.is_empty() {
        return 0.0;
    }
    let i = usize::from(level).min(table.len() - 1);
    table[i]
}

impl SpellData {
    /// Minimal record with empty tables; mostly useful for tests and built-ins.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            targeting: Targeting::SelfCast,
            cast_time_s: 0.0,
            cooldown_s: Vec::new(),
            channel_duration_s: Vec::new(),
            mana_cost: Vec::new(),
            cast_range: Vec::new(),
            flags: 0,
            missile_speed: 0.0,
            line_width: 0.0,
            hit_effect: None,
        }
    }

    pub fn ability_id(&self) -> u32 {
        self.id.unwrap_or_else(|| hash_name(&self.name))
    }

    pub fn cooldown(&self, level: u8) -> f32 {
        at_level(&self.cooldown_s, level)
    }

    pub fn channel_duration(&self, level: u8) -> f32 {
        at_level(&self.channel_duration_s, level)
    }

    pub fn mana_cost(&self, level: u8) -> f32 {
        at_level(&self.mana_cost, level)
    }

    pub fn cast_range(&self, level: u8) -> f32 {
        at_level(&self.cast_range, level)
    }

    pub fn is_instant(&self) -> bool {
        self.flags & flags::INSTANT_CAST != 0
    }

    pub fn requires_unit_target(&self) -> bool {
        self.targeting == Targeting::Unit
    }

    /// Level tables must not be longer than the level range and must hold
    /// non-negative values.
    pub fn validate(&self) -> anyhow::Result<()> {
        let max = usize::from(MAX_SPELL_LEVEL) + 1;
        for (label, table) in [
            ("cooldown_s", &self.cooldown_s),
            ("channel_duration_s", &self.channel_duration_s),
            ("mana_cost", &self.mana_cost),
            ("cast_range", &self.cast_range),
        ] {
            if table.len() > max {
                anyhow::bail!("{}: {label} has {} entries (max {max})", self.name, table.len());
            }
            if table.iter().any(|v| *v < 0.0 || !v.is_finite()) {
                anyhow::bail!("{}: {label} has a negative or non-finite entry", self.name);
            }
        }
        if self.cast_time_s < 0.0 {
            anyhow::bail!("{}: negative cast_time_s", self.name);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn level_lookup_clamps_to_last_entry() {
        let mut d = SpellData::named("q");
        d.cooldown_s = vec![8.0, 7.0, 6.0];
        assert_eq!(d.cooldown(0), 8.0);
        assert_eq!(d.cooldown(2), 6.0);
        assert_eq!(d.cooldown(5), 6.0);
        assert_eq!(d.channel_duration(3), 0.0);
    }

    #[test]
    fn parses_json_with_defaults() {
        let txt = r#"{ "name": "Bolt", "targeting": "point", "cast_time_s": 0.25,
                       "cooldown_s": [8, 7, 6, 5, 4, 3], "flags": 1 }"#;
        let d: SpellData = serde_json::from_str(txt).expect("parse");
        assert_eq!(d.targeting, Targeting::Point);
        assert!(d.is_instant());
        assert!(d.hit_effect.is_none());
        assert_eq!(d.ability_id(), hash_name("Bolt"));
        d.validate().unwrap();
    }

    #[test]
    fn explicit_id_wins() {
        let mut d = SpellData::named("Bolt");
        d.id = Some(42);
        assert_eq!(d.ability_id(), 42);
    }

    #[test]
    fn validate_rejects_oversized_tables() {
        let mut d = SpellData::named("x");
        d.mana_cost = vec![1.0; 7];
        assert!(d.validate().is_err());
    }
}
