//! Ability script binding: behavior resolved by ability name at Spell
//! construction and invoked at fixed lifecycle points.
//!
//! Scripts act on the world only through [`Effects`]. A name without a
//! registered script resolves to [`NoopScript`], so the state machine always
//! calls every hook.

use std::collections::HashMap;

use crate::effects::Effects;
use crate::objects::Projectile;
use crate::spell::SpellInfo;
use crate::unit::UnitId;

/// Lifecycle hooks. Every hook defaults to a no-op; the owning unit is
/// `spell.owner`. Per-ability mutable state lives on the implementing type
/// and is scoped to one Spell.
pub trait AbilityScript {
    /// Once, when the Spell is created and before any cast.
    fn on_activate(&mut self, _fx: &mut Effects<'_>, _owner: UnitId) {}
    /// Cast accepted. Notification only; cannot veto.
    fn on_start_casting(&mut self, _fx: &mut Effects<'_>, _spell: &SpellInfo, _target: Option<UnitId>) {}
    /// Cast time elapsed (or instant cast); spawn hazards and apply buffs here.
    fn on_finish_casting(&mut self, _fx: &mut Effects<'_>, _spell: &SpellInfo, _target: Option<UnitId>) {}
    /// One unit hit by a projectile or laser of this ability.
    fn apply_effects(
        &mut self,
        _fx: &mut Effects<'_>,
        _spell: &SpellInfo,
        _target: UnitId,
        _projectile: Option<&Projectile>,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopScript;

impl AbilityScript for NoopScript {}

pub type ScriptFactory = Box<dyn Fn() -> Box<dyn AbilityScript>>;

/// Name -> factory table. Lookups are case-insensitive, matching ability
/// identity hashing.
#[derive(Default)]
pub struct ScriptRegistry {
    factories: HashMap<String, ScriptFactory>,
}

impl std::fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ScriptRegistry").field("scripts", &names).finish()
    }
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the bundled content scripts.
    pub fn with_builtins() -> Self {
        let mut r = Self::new();
        crate::scripts::register_builtins(&mut r);
        r
    }

    /// Registers `factory` under `name`; a later registration replaces an
    /// earlier one.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn AbilityScript> + 'static,
    {
        if self.factories.insert(name.to_ascii_lowercase(), Box::new(factory)).is_some() {
            log::warn!("script '{}' re-registered", name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_ascii_lowercase())
    }

    pub fn resolve(&self, name: &str) -> Box<dyn AbilityScript> {
        match self.factories.get(&name.to_ascii_lowercase()) {
            Some(f) => f(),
            None => {
                log::debug!("no script for '{}', using no-op", name);
                Box::new(NoopScript)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_resolve_case_insensitively() {
        let r = ScriptRegistry::with_builtins();
        for n in ["Bolt", "barrier", "BLINK", "Drain"] {
            assert!(r.contains(n), "missing {n}");
        }
        assert!(!r.contains("Unknown"));
    }
}
