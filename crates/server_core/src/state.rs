//! Authoritative server state and the fixed-step tick pipeline.
//!
//! Per `step_authoritative`:
//! 1. promote timers and hazards staged since the last step
//! 2. advance every non-ready Spell (spell-table order)
//! 3. apply queued cooldown overrides
//! 4. move units, step projectiles and lasers, dispatch impacts
//! 5. advance timers and fire the due ones
//! 6. flush notifications to the transport
//!
//! Cooldown overrides queued by hooks are applied after each pass that can
//! queue them.

use data_runtime::configs::server::ServerCfg;
use data_runtime::specdb::SpecDb;
use glam::Vec2;
use net_core::codec::SnapshotEncode;
use net_core::transport::{Transport, TrySendError};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use crate::effects::{CooldownChange, CooldownRequest, Effects, Outbound, Outbox};
use crate::error::{CastRejected, SpellError};
use crate::nav::{NavQuery, OpenField};
use crate::objects::SpellKey;
use crate::script::ScriptRegistry;
use crate::spell::{Spell, SpellState};
use crate::systems;
use crate::timers::TimerScheduler;
use crate::unit::{Unit, UnitId};
use crate::world::World;

pub struct ServerState {
    pub world: World,
    spells: BTreeMap<SpellKey, Spell>,
    timers: TimerScheduler,
    outbox: Outbox,
    requests: Vec<CooldownRequest>,
    content: Arc<SpecDb>,
    scripts: ScriptRegistry,
    transport: Option<Box<dyn Transport>>,
    cfg: ServerCfg,
    tick: u64,
    time_s: f64,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("tick", &self.tick)
            .field("world", &self.world)
            .field("spells", &self.spells.len())
            .field("timers", &self.timers)
            .field("outbox", &self.outbox.len())
            .finish_non_exhaustive()
    }
}

impl ServerState {
    pub fn new(cfg: ServerCfg, content: Arc<SpecDb>, scripts: ScriptRegistry) -> Self {
        Self::with_nav(cfg, content, scripts, Box::new(OpenField))
    }

    pub fn with_nav(cfg: ServerCfg, content: Arc<SpecDb>, scripts: ScriptRegistry, nav: Box<dyn NavQuery>) -> Self {
        Self {
            world: World::new(nav, cfg.max_buff_slots),
            spells: BTreeMap::new(),
            timers: TimerScheduler::new(),
            outbox: Outbox::default(),
            requests: Vec::new(),
            content,
            scripts,
            transport: None,
            cfg,
            tick: 0,
            time_s: 0.0,
        }
    }

    /// Route notifications to `transport` on every flush. Without one they
    /// accumulate in the outbox for the caller to drain.
    pub fn attach_transport(&mut self, transport: Box<dyn Transport>) {
        self.transport = Some(transport);
    }

    pub fn cfg(&self) -> &ServerCfg {
        &self.cfg
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    /// Spell table and a facade over the rest of the state, borrowed apart.
    fn parts(&mut self) -> (&mut BTreeMap<SpellKey, Spell>, Effects<'_>) {
        let fx = Effects::new(&mut self.world, &mut self.outbox, &mut self.timers, &mut self.requests);
        (&mut self.spells, fx)
    }

    /// Run `f` against the Effect Facade outside the tick pipeline. Queued
    /// cooldown overrides are applied before returning.
    pub fn with_effects<R>(&mut self, f: impl FnOnce(&mut Effects<'_>) -> R) -> R {
        let r = {
            let (_, mut fx) = self.parts();
            f(&mut fx)
        };
        self.apply_cooldown_requests();
        r
    }

    pub fn spawn_unit(&mut self, unit: Unit) -> UnitId {
        self.world.spawn(unit)
    }

    /// Despawn a unit along with its abilities.
    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        self.spells.retain(|k, _| k.owner != id);
        self.world.units.remove(&id)
    }

    pub fn add_spell(&mut self, owner: UnitId, slot: u8, name: &str) -> Result<(), SpellError> {
        let key = SpellKey { owner, slot };
        if self.spells.contains_key(&key) {
            return Err(SpellError::SlotOccupied { owner, slot });
        }
        let primary_slots = self.cfg.primary_slots;
        let content = Arc::clone(&self.content);
        let spell = {
            let fx = &mut Effects::new(&mut self.world, &mut self.outbox, &mut self.timers, &mut self.requests);
            Spell::new(owner, name, slot, primary_slots, &content, &self.scripts, fx)?
        };
        log::debug!("{:?} learns {} in slot {} ({:#010x})", owner, name, slot, spell.id());
        self.spells.insert(key, spell);
        self.apply_cooldown_requests();
        Ok(())
    }

    pub fn spell(&self, owner: UnitId, slot: u8) -> Option<&Spell> {
        self.spells.get(&SpellKey { owner, slot })
    }

    pub fn spells(&self) -> impl Iterator<Item = &Spell> {
        self.spells.values()
    }

    /// Command-layer cast: the caster must be alive, the slot `Ready` and
    /// the target in range before any net id is reserved.
    pub fn cast(&mut self, owner: UnitId, slot: u8, pos: Vec2, target: Option<UnitId>) -> Result<(), CastRejected> {
        let res = self.try_cast(owner, slot, pos, target);
        if let Err(e) = &res {
            log::debug!("cast rejected: {e}");
            metrics::counter!("spell.cast_rejected_total").increment(1);
        }
        self.apply_cooldown_requests();
        res
    }

    fn try_cast(&mut self, owner: UnitId, slot: u8, pos: Vec2, target: Option<UnitId>) -> Result<(), CastRejected> {
        let caster = self.world.unit(owner).ok_or(CastRejected::UnknownUnit(owner))?;
        if !caster.alive() {
            return Err(CastRejected::CasterDead(owner));
        }
        let key = SpellKey { owner, slot };
        let spell = self.spells.get(&key).ok_or(CastRejected::NoSuchSpell { owner, slot })?;
        let state = spell.state();
        if state != SpellState::Ready {
            return Err(CastRejected::NotReady { slot, state: state.name() });
        }
        spell.check_range(&self.world, target)?;
        let future_proj_net_id = self.world.claim_net_id(None);
        let spell_net_id = self.world.claim_net_id(None);
        let (spells, mut fx) = self.parts();
        match spells.get_mut(&key) {
            Some(spell) => spell.cast(&mut fx, pos, target, future_proj_net_id, spell_net_id),
            None => Err(CastRejected::NoSuchSpell { owner, slot }),
        }
    }

    pub fn level_up(&mut self, owner: UnitId, slot: u8) -> Result<u8, SpellError> {
        let (spells, mut fx) = self.parts();
        let spell = spells
            .get_mut(&SpellKey { owner, slot })
            .ok_or(SpellError::NoSuchSpell { owner, slot })?;
        Ok(spell.level_up(&mut fx))
    }

    pub fn set_cooldown(&mut self, owner: UnitId, slot: u8, value: f32) -> Result<(), SpellError> {
        self.adjust_cooldown(SpellKey { owner, slot }, CooldownChange::Set(value))
    }

    pub fn lower_cooldown(&mut self, owner: UnitId, slot: u8, delta: f32) -> Result<(), SpellError> {
        self.adjust_cooldown(SpellKey { owner, slot }, CooldownChange::Lower(delta))
    }

    fn adjust_cooldown(&mut self, key: SpellKey, change: CooldownChange) -> Result<(), SpellError> {
        let (spells, mut fx) = self.parts();
        let spell = spells
            .get_mut(&key)
            .ok_or(SpellError::NoSuchSpell { owner: key.owner, slot: key.slot })?;
        match change {
            CooldownChange::Set(v) => spell.set_cooldown(&mut fx, v),
            CooldownChange::Lower(d) => spell.lower_cooldown(&mut fx, d),
        }
        Ok(())
    }

    fn apply_cooldown_requests(&mut self) {
        if self.requests.is_empty() {
            return;
        }
        let queued = std::mem::take(&mut self.requests);
        for req in queued {
            if let Err(e) = self.adjust_cooldown(req.key, req.change) {
                log::warn!("cooldown override dropped: {e}");
            }
        }
    }

    /// Advance the simulation by `elapsed_ms`. A late step simply carries a
    /// larger delta; a negative one counts as zero.
    pub fn step_authoritative(&mut self, elapsed_ms: f32) {
        let t0 = Instant::now();
        let elapsed_ms = elapsed_ms.max(0.0);
        let dt = elapsed_ms / 1000.0;

        self.timers.promote_staged();
        self.world.promote_staged();

        {
            let (spells, mut fx) = self.parts();
            for spell in spells.values_mut() {
                if spell.state() != SpellState::Ready {
                    spell.tick(&mut fx, elapsed_ms);
                }
            }
        }
        self.apply_cooldown_requests();

        self.step_world(dt);
        self.apply_cooldown_requests();

        let due = self.timers.advance(dt);
        if !due.is_empty() {
            metrics::counter!("timers.fired_total").increment(due.len() as u64);
            let (_, mut fx) = self.parts();
            for t in due {
                t.fire(&mut fx);
            }
        }
        self.apply_cooldown_requests();

        self.tick += 1;
        self.time_s += f64::from(dt);
        self.flush();

        let ms = t0.elapsed().as_secs_f64() * 1000.0;
        metrics::histogram!("sim.tick.ms").record(ms);
        if ms > f64::from(self.cfg.tick_ms) {
            log::warn!("tick {} took {:.2} ms (budget {} ms)", self.tick, ms, self.cfg.tick_ms);
        }
    }

    fn step_world(&mut self, dt: f32) {
        systems::movement::step(&mut self.world, dt);
        let active: BTreeSet<SpellKey> = self
            .spells
            .iter()
            .filter(|(_, s)| s.state().is_active())
            .map(|(k, _)| *k)
            .collect();
        let proj = systems::projectiles::step_projectiles(&mut self.world, dt);
        let laser_hits = systems::projectiles::step_lasers(&mut self.world, &active);

        let (spells, mut fx) = self.parts();
        for impact in proj.impacts.iter().chain(laser_hits.iter()) {
            match spells.get_mut(&impact.spell) {
                Some(spell) => spell.apply_effects(&mut fx, impact.target, impact.projectile.as_ref()),
                None => log::debug!("impact from retired spell {:?} ignored", impact.spell),
            }
        }
        for id in proj.finished {
            fx.destroy_projectile(id);
        }
    }

    pub fn pending_outbound(&self) -> &Outbox {
        &self.outbox
    }

    pub fn drain_outbound(&mut self) -> Vec<Outbound> {
        self.outbox.drain()
    }

    /// Encode and broadcast queued notifications in emission order. Send
    /// failures drop the message; authoritative state is never rolled back.
    /// Returns the number of messages handed to the transport.
    pub fn flush(&mut self) -> usize {
        let Some(transport) = self.transport.as_ref() else {
            return 0;
        };
        let mut sent = 0;
        let mut buf = Vec::with_capacity(64);
        for out in self.outbox.drain() {
            buf.clear();
            out.msg.encode(&mut buf);
            match transport.broadcast(&buf, out.channel) {
                Ok(()) => sent += 1,
                Err(e) => {
                    let reason = match e {
                        TrySendError::Full => "full",
                        TrySendError::Disconnected => "disconnected",
                    };
                    metrics::counter!("net.send_errors_total", "reason" => reason).increment(1);
                    log::warn!("replication dropped {} ({e})", out.msg.kind());
                }
            }
        }
        metrics::counter!("net.msgs_sent_total").increment(sent as u64);
        sent
    }
}
