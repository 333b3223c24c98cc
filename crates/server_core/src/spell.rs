//! Per-slot ability state machine.
//!
//! `Ready -> Casting -> Cooldown -> Ready`, with `Casting -> Channeling ->
//! Cooldown` when the level defines a channel duration. Time only moves in
//! `tick`; everything gameplay-visible goes through [`Effects`].

use data_runtime::specdb::SpecDb;
use data_runtime::spell::{MAX_SPELL_LEVEL, SpellData};
use glam::Vec2;
use std::sync::Arc;

use crate::effects::Effects;
use crate::error::{CastRejected, SpellError};
use crate::objects::{Projectile, SpellKey};
use crate::script::{AbilityScript, ScriptRegistry};
use crate::unit::UnitId;
use crate::world::World;

/// Slot index of the passive ability.
pub const PASSIVE_SLOT: u8 = 14;

/// Lifetime of the per-hit visual spawned by `apply_effects`, in seconds.
pub const HIT_EFFECT_S: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpellState {
    Ready,
    Casting { remaining: f32 },
    Channeling { remaining: f32 },
    Cooldown { remaining: f32 },
}

impl SpellState {
    pub fn name(&self) -> &'static str {
        match self {
            SpellState::Ready => "ready",
            SpellState::Casting { .. } => "casting",
            SpellState::Channeling { .. } => "channeling",
            SpellState::Cooldown { .. } => "cooldown",
        }
    }

    /// Casting or channeling.
    pub fn is_active(&self) -> bool {
        matches!(self, SpellState::Casting { .. } | SpellState::Channeling { .. })
    }
}

/// What scripts see of a Spell: identity, level, content and the current
/// cast's target and correlation ids.
#[derive(Debug, Clone)]
pub struct SpellInfo {
    pub owner: UnitId,
    pub slot: u8,
    pub level: u8,
    pub name: String,
    pub data: Arc<SpellData>,
    pub target: Option<UnitId>,
    pub target_pos: Vec2,
    /// Network id reserved for the projectile this cast will spawn.
    pub future_proj_net_id: u32,
    pub spell_net_id: u32,
}

impl SpellInfo {
    pub fn key(&self) -> SpellKey {
        SpellKey { owner: self.owner, slot: self.slot }
    }

    pub fn ability_id(&self) -> u32 {
        self.data.ability_id()
    }
}

pub struct Spell {
    info: SpellInfo,
    state: SpellState,
    script: Box<dyn AbilityScript>,
    /// Primary slots replicate cooldowns and drive the caster's mana cost stat.
    primary: bool,
}

impl std::fmt::Debug for Spell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spell")
            .field("name", &self.info.name)
            .field("owner", &self.info.owner)
            .field("slot", &self.info.slot)
            .field("level", &self.info.level)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Spell {
    /// Binds `name` to `owner`'s `slot`, resolving content and script, and
    /// fires the script's activation hook.
    pub fn new(
        owner: UnitId,
        name: &str,
        slot: u8,
        primary_slots: u8,
        content: &SpecDb,
        scripts: &ScriptRegistry,
        fx: &mut Effects<'_>,
    ) -> Result<Self, SpellError> {
        let data = content
            .get_spell_data(name)
            .ok_or_else(|| SpellError::MissingSpellData(name.to_string()))?;
        if fx.unit(owner).is_none() {
            return Err(SpellError::UnknownUnit(owner));
        }
        let mut spell = Self {
            info: SpellInfo {
                owner,
                slot,
                level: 0,
                name: name.to_string(),
                data,
                target: None,
                target_pos: Vec2::ZERO,
                future_proj_net_id: 0,
                spell_net_id: 0,
            },
            state: SpellState::Ready,
            script: scripts.resolve(name),
            primary: slot < primary_slots,
        };
        spell.sync_mana_cost(fx);
        spell.script.on_activate(fx, owner);
        Ok(spell)
    }

    pub fn info(&self) -> &SpellInfo {
        &self.info
    }

    pub fn key(&self) -> SpellKey {
        self.info.key()
    }

    pub fn state(&self) -> SpellState {
        self.state
    }

    pub fn level(&self) -> u8 {
        self.info.level
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// Stable ability identity used on the wire.
    pub fn id(&self) -> u32 {
        self.info.ability_id()
    }

    /// Full cooldown for the current level.
    pub fn cooldown(&self) -> f32 {
        self.info.data.cooldown(self.info.level)
    }

    /// Remaining cooldown; zero outside `Cooldown`.
    pub fn current_cooldown(&self) -> f32 {
        match self.state {
            SpellState::Cooldown { remaining } => remaining.max(0.0),
            _ => 0.0,
        }
    }

    pub fn slot_label(&self) -> &'static str {
        match self.info.slot {
            0 => "Q",
            1 => "W",
            2 => "E",
            3 => "R",
            PASSIVE_SLOT => "Passive",
            _ => "undefined",
        }
    }

    /// Start a cast. Only a unit-targeted ability aimed at a unit beyond the
    /// level's cast range is rejected; a rejection changes nothing.
    pub fn cast(
        &mut self,
        fx: &mut Effects<'_>,
        target_pos: Vec2,
        target: Option<UnitId>,
        future_proj_net_id: u32,
        spell_net_id: u32,
    ) -> Result<(), CastRejected> {
        let owner = self.info.owner;
        self.check_range(fx.world(), target)?;

        self.info.target = target;
        self.info.target_pos = target_pos;
        self.info.future_proj_net_id = future_proj_net_id;
        self.info.spell_net_id = spell_net_id;
        metrics::counter!("spell.casts_total").increment(1);
        log::debug!("{:?} casts {} ({})", owner, self.info.name, self.slot_label());

        self.script.on_start_casting(fx, &self.info, target);

        let cast_time = self.info.data.cast_time_s;
        if cast_time > 0.0 && !self.info.data.is_instant() {
            self.state = SpellState::Casting { remaining: cast_time };
            if let Some(u) = fx.world_mut().unit_mut(owner) {
                u.is_casting = true;
                u.stop_moving();
            }
        } else {
            self.finish_casting(fx);
        }
        Ok(())
    }

    /// Range gate for unit-targeted abilities aimed at a unit.
    pub fn check_range(&self, world: &World, target: Option<UnitId>) -> Result<(), CastRejected> {
        let owner = self.info.owner;
        if self.info.data.requires_unit_target()
            && let Some(t) = target
        {
            let from = world.unit(owner).ok_or(CastRejected::UnknownUnit(owner))?.pos;
            let to = world.unit(t).ok_or(CastRejected::UnknownUnit(t))?.pos;
            let range = self.info.data.cast_range(self.info.level);
            let distance = from.distance(to);
            if distance > range {
                return Err(CastRejected::OutOfRange { target: t, distance, range });
            }
        }
        Ok(())
    }

    /// Advance timed phases by `elapsed_ms`. One call may cross more than one
    /// phase boundary (cast completion straight into a channel).
    pub fn tick(&mut self, fx: &mut Effects<'_>, elapsed_ms: f32) {
        let dt = elapsed_ms / 1000.0;
        match self.state {
            SpellState::Ready => {}
            SpellState::Casting { remaining } => {
                if let Some(u) = fx.world_mut().unit_mut(self.info.owner) {
                    u.is_casting = true;
                }
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.finish_casting(fx);
                } else {
                    self.state = SpellState::Casting { remaining };
                }
            }
            SpellState::Channeling { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.finish_channeling(fx);
                } else {
                    self.state = SpellState::Channeling { remaining };
                }
            }
            SpellState::Cooldown { remaining } => {
                let remaining = remaining - dt;
                self.state = if remaining <= 0.0 {
                    SpellState::Ready
                } else {
                    SpellState::Cooldown { remaining }
                };
            }
        }
    }

    fn finish_casting(&mut self, fx: &mut Effects<'_>) {
        let target = self.info.target;
        self.script.on_finish_casting(fx, &self.info, target);
        if self.info.data.channel_duration(self.info.level) > 0.0 {
            self.channel(fx);
        } else {
            self.enter_cooldown(fx);
        }
    }

    fn channel(&mut self, fx: &mut Effects<'_>) {
        let remaining = self.info.data.channel_duration(self.info.level);
        self.state = SpellState::Channeling { remaining };
        if let Some(u) = fx.world_mut().unit_mut(self.info.owner) {
            u.is_casting = true;
        }
    }

    fn finish_channeling(&mut self, fx: &mut Effects<'_>) {
        self.enter_cooldown(fx);
    }

    fn enter_cooldown(&mut self, fx: &mut Effects<'_>) {
        let cd = self.cooldown();
        self.state = SpellState::Cooldown { remaining: cd };
        if let Some(u) = fx.world_mut().unit_mut(self.info.owner) {
            u.is_casting = false;
        }
        if self.primary {
            fx.notify_cooldown(self.info.owner, self.info.slot, cd, cd);
        }
    }

    /// Raise the level by one, saturating at the cap. Returns the new level.
    pub fn level_up(&mut self, fx: &mut Effects<'_>) -> u8 {
        if self.info.level < MAX_SPELL_LEVEL {
            self.info.level += 1;
            self.sync_mana_cost(fx);
        }
        self.info.level
    }

    fn sync_mana_cost(&self, fx: &mut Effects<'_>) {
        if !self.primary {
            return;
        }
        let cost = self.info.data.mana_cost(self.info.level);
        if let Some(u) = fx.world_mut().unit_mut(self.info.owner) {
            let slot = usize::from(self.info.slot);
            if u.stats.mana_cost.len() <= slot {
                u.stats.mana_cost.resize(slot + 1, 0.0);
            }
            u.stats.mana_cost[slot] = cost;
        }
    }

    /// Force the cooldown. `value <= 0` means `Ready` and notifies `(0, 0)`;
    /// anything else means `Cooldown` with `value` remaining. Always notifies.
    pub fn set_cooldown(&mut self, fx: &mut Effects<'_>, value: f32) {
        if self.state.is_active()
            && let Some(u) = fx.world_mut().unit_mut(self.info.owner)
        {
            u.is_casting = false;
        }
        let (current, max) = if value <= 0.0 {
            self.state = SpellState::Ready;
            (0.0, 0.0)
        } else {
            self.state = SpellState::Cooldown { remaining: value };
            (value, self.cooldown())
        };
        fx.notify_cooldown(self.info.owner, self.info.slot, current, max);
    }

    pub fn lower_cooldown(&mut self, fx: &mut Effects<'_>, delta: f32) {
        let v = self.current_cooldown() - delta;
        self.set_cooldown(fx, v);
    }

    /// Resolve a hit on `target`: spawn the ability's hit visual (if any)
    /// and hand the hit to the script.
    pub fn apply_effects(&mut self, fx: &mut Effects<'_>, target: UnitId, projectile: Option<&Projectile>) {
        if let Some(effect) = self.info.data.hit_effect.as_deref()
            && let Err(e) = fx.add_particle_target(self.info.owner, effect, target, 1.0, "", Some(HIT_EFFECT_S))
        {
            log::warn!("{}: hit effect skipped: {e}", self.info.name);
        }
        self.script.apply_effects(fx, &self.info, target, projectile);
    }
}
