//! Effect Facade: the only sanctioned path for gameplay-visible mutation.
//!
//! Every operation applies the authoritative change first and then enqueues
//! exactly one outbound notification for it, before returning. Nothing here
//! notifies without mutating or mutates without notifying, with three
//! documented exceptions:
//! - server-only projectiles and lasers are simulated but never replicated
//! - `create_timer` schedules server work, which has no client view
//! - `send_packet` injects raw bytes that have no authoritative counterpart
//!
//! Cooldown overrides requested from hooks are queued and applied by the tick
//! loop once the current hook pass completes.

use glam::Vec2;
use net_core::Channel;
use net_core::msg::ServerMsg;
use std::collections::BTreeSet;

use crate::buff::{Buff, BuffId};
use crate::error::EffectError;
use crate::objects::{Laser, Particle, Projectile, SpellKey, Target, WorldObject};
use crate::spell::SpellInfo;
use crate::timers::{TimerHandle, TimerScheduler};
use crate::unit::{Dash, Team, Unit, UnitId, UnitKind};
use crate::world::World;

#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub channel: Channel,
    pub msg: ServerMsg,
}

/// Notifications awaiting replication, in emission order.
#[derive(Debug, Default)]
pub struct Outbox {
    queue: Vec<Outbound>,
}

impl Outbox {
    pub fn push(&mut self, channel: Channel, msg: ServerMsg) {
        metrics::counter!("facade.notify_total", "kind" => msg.kind()).increment(1);
        self.queue.push(Outbound { channel, msg });
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outbound> {
        self.queue.iter()
    }

    pub fn drain(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.queue)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CooldownChange {
    Set(f32),
    Lower(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CooldownRequest {
    pub key: SpellKey,
    pub change: CooldownChange,
}

/// Travel parameters for `dash_to_unit` / `dash_to_location`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashParams {
    pub speed: f32,
    pub keep_facing: bool,
    pub leap_height: f32,
    pub follow_max_distance: f32,
    pub back_distance: f32,
    pub travel_time: f32,
}

impl Default for DashParams {
    fn default() -> Self {
        Self {
            speed: 1200.0,
            keep_facing: false,
            leap_height: 0.0,
            follow_max_distance: 0.0,
            back_distance: 0.0,
            travel_time: 0.0,
        }
    }
}

#[inline]
fn xy(v: Vec2) -> [f32; 2] {
    [v.x, v.y]
}

/// Borrowed simulation context handed to spells, scripts and timer callbacks.
pub struct Effects<'a> {
    world: &'a mut World,
    outbox: &'a mut Outbox,
    timers: &'a mut TimerScheduler,
    requests: &'a mut Vec<CooldownRequest>,
}

impl<'a> Effects<'a> {
    pub fn new(
        world: &'a mut World,
        outbox: &'a mut Outbox,
        timers: &'a mut TimerScheduler,
        requests: &'a mut Vec<CooldownRequest>,
    ) -> Self {
        Self { world, outbox, timers, requests }
    }

    pub fn world(&self) -> &World {
        &*self.world
    }

    /// Direct world access for state that is never replicated on its own
    /// (casting flag, movement pin, stats).
    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut *self.world
    }

    fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit, EffectError> {
        self.world.unit_mut(id).ok_or(EffectError::UnknownUnit(id))
    }

    fn notify(&mut self, msg: ServerMsg) {
        self.outbox.push(Channel::S2C, msg);
    }

    // --- Buffs -----------------------------------------------------------

    /// Attach `name` to `onto`. Re-applying a buff from the same source
    /// restacks it in place under a new id; a positive duration schedules
    /// its own removal.
    pub fn add_buff(
        &mut self,
        name: &str,
        duration: f32,
        stacks: u8,
        onto: UnitId,
        from: UnitId,
    ) -> Result<BuffId, EffectError> {
        let id = self.attach_buff(name, duration, stacks, onto, from, false)?;
        if duration > 0.0 {
            self.create_timer(duration, move |fx| {
                fx.remove_buff(onto, id);
            });
        }
        Ok(id)
    }

    /// HUD-only buff icon. `remove_after` schedules its removal; `None`
    /// leaves it until removed explicitly.
    pub fn add_buff_hud_visual(
        &mut self,
        name: &str,
        duration: f32,
        stacks: u8,
        onto: UnitId,
        remove_after: Option<f32>,
    ) -> Result<BuffId, EffectError> {
        let id = self.attach_buff(name, duration, stacks, onto, onto, true)?;
        if let Some(after) = remove_after {
            self.create_timer(after, move |fx| {
                fx.remove_buff(onto, id);
            });
        }
        Ok(id)
    }

    fn attach_buff(
        &mut self,
        name: &str,
        duration: f32,
        stacks: u8,
        onto: UnitId,
        from: UnitId,
        hud_only: bool,
    ) -> Result<BuffId, EffectError> {
        let id = self.world.next_buff_id();
        let max_slots = self.world.max_buff_slots;
        let unit = self.unit_mut(onto)?;
        let existing = unit
            .buffs
            .iter()
            .position(|b| b.name == name && b.source == from && b.hud_only == hud_only);
        let (slot, stacks) = match existing {
            Some(i) => {
                let old = unit.buffs.remove(i);
                (old.slot, old.stacks.saturating_add(stacks.max(1)))
            }
            None => {
                let slot = unit.free_buff_slot(max_slots).ok_or(EffectError::NoBuffSlot(onto))?;
                (slot, stacks.max(1))
            }
        };
        unit.buffs.push(Buff {
            id,
            name: name.to_string(),
            source: from,
            target: onto,
            stacks,
            duration,
            slot,
            hud_only,
        });
        log::debug!("buff '{}' x{} on {:?} (slot {})", name, stacks, onto, slot);
        self.notify(ServerMsg::AddBuff {
            target: onto.0,
            source: from.0,
            slot,
            name: name.to_string(),
            stacks,
            duration,
        });
        Ok(id)
    }

    /// Removes one buff application. Stale ids are a silent no-op.
    pub fn remove_buff(&mut self, unit: UnitId, id: BuffId) -> bool {
        let Some(u) = self.world.unit_mut(unit) else {
            return false;
        };
        let Some(i) = u.buffs.iter().position(|b| b.id == id) else {
            return false;
        };
        let b = u.buffs.remove(i);
        self.notify(ServerMsg::RemoveBuff { target: unit.0, slot: b.slot, name: b.name });
        true
    }

    // --- Particles -------------------------------------------------------

    /// Visual at a point. `remove_after` schedules its destruction; `None`
    /// keeps it until `remove_particle`.
    pub fn add_particle(
        &mut self,
        owner: UnitId,
        name: &str,
        to: Vec2,
        size: f32,
        bone: &str,
        remove_after: Option<f32>,
    ) -> u32 {
        self.spawn_particle(owner, name, Target::Point(to), size, bone, remove_after)
    }

    pub fn add_particle_target(
        &mut self,
        owner: UnitId,
        name: &str,
        target: UnitId,
        size: f32,
        bone: &str,
        remove_after: Option<f32>,
    ) -> Result<u32, EffectError> {
        if self.world.unit(target).is_none() {
            return Err(EffectError::UnknownUnit(target));
        }
        Ok(self.spawn_particle(owner, name, Target::Unit(target), size, bone, remove_after))
    }

    fn spawn_particle(
        &mut self,
        owner: UnitId,
        name: &str,
        target: Target,
        size: f32,
        bone: &str,
        remove_after: Option<f32>,
    ) -> u32 {
        let net_id = self.world.claim_net_id(None);
        let target_pos = self.resolve(target);
        self.world.particles.insert(
            net_id,
            Particle {
                net_id,
                owner,
                name: name.to_string(),
                target,
                size,
                bone: bone.to_string(),
            },
        );
        self.notify(ServerMsg::ParticleSpawn {
            net_id,
            owner: owner.0,
            name: name.to_string(),
            target_unit: target.unit().map(|u| u.0),
            target_pos: xy(target_pos),
            size,
            bone: bone.to_string(),
        });
        if let Some(after) = remove_after {
            self.create_timer(after, move |fx| {
                fx.remove_particle(net_id);
            });
        }
        net_id
    }

    pub fn remove_particle(&mut self, net_id: u32) -> bool {
        if self.world.particles.remove(&net_id).is_none() {
            return false;
        }
        self.notify(ServerMsg::ParticleDestroy { net_id });
        true
    }

    // --- Projectiles / lasers -------------------------------------------

    /// Missile from the caster toward a point. Eligible for simulation next tick.
    pub fn add_projectile(
        &mut self,
        spell: &SpellInfo,
        missile: &str,
        to: Vec2,
        server_only: bool,
    ) -> Result<u32, EffectError> {
        self.spawn_projectile(spell, missile, Target::Point(to), server_only)
    }

    /// Homing missile toward a unit.
    pub fn add_projectile_target(
        &mut self,
        spell: &SpellInfo,
        missile: &str,
        target: UnitId,
        server_only: bool,
    ) -> Result<u32, EffectError> {
        if self.world.unit(target).is_none() {
            return Err(EffectError::UnknownUnit(target));
        }
        self.spawn_projectile(spell, missile, Target::Unit(target), server_only)
    }

    fn spawn_projectile(
        &mut self,
        spell: &SpellInfo,
        missile: &str,
        target: Target,
        server_only: bool,
    ) -> Result<u32, EffectError> {
        let from = self.position_of(spell.owner).ok_or(EffectError::UnknownUnit(spell.owner))?;
        let net_id = self.world.claim_net_id(Some(spell.future_proj_net_id));
        let p = Projectile {
            net_id,
            owner: spell.owner,
            spell: spell.key(),
            ability_id: spell.ability_id(),
            name: missile.to_string(),
            pos: from,
            target,
            speed: spell.data.missile_speed,
            width: spell.data.line_width,
            flags: spell.data.flags,
            server_only,
        };
        let target_pos = self.resolve(target);
        self.world.add_object(WorldObject::Projectile(p));
        metrics::counter!("projectile.spawned_total").increment(1);
        if !server_only {
            self.notify(ServerMsg::ProjectileSpawn {
                net_id,
                owner: spell.owner.0,
                ability_id: spell.ability_id(),
                name: missile.to_string(),
                from: xy(from),
                target_unit: target.unit().map(|u| u.0),
                target_pos: xy(target_pos),
                speed: spell.data.missile_speed,
                width: spell.data.line_width,
                flags: spell.data.flags,
            });
        }
        Ok(net_id)
    }

    /// Removes a live projectile; replicated ones emit a destroy.
    pub(crate) fn destroy_projectile(&mut self, net_id: u32) -> bool {
        let Some(p) = self.world.projectiles.remove(&net_id) else {
            return false;
        };
        if !p.server_only {
            self.notify(ServerMsg::ProjectileDestroy { net_id });
        }
        true
    }

    /// Server-only line hazard from the caster to `to`.
    pub fn add_laser(&mut self, spell: &SpellInfo, to: Vec2, affect_as_cast_is_over: bool) -> Result<u32, EffectError> {
        let from = self.position_of(spell.owner).ok_or(EffectError::UnknownUnit(spell.owner))?;
        let net_id = self.world.claim_net_id(None);
        self.world.add_object(WorldObject::Laser(Laser {
            net_id,
            owner: spell.owner,
            spell: spell.key(),
            from,
            to,
            width: spell.data.line_width,
            flags: spell.data.flags,
            affect_as_cast_is_over,
            hit: BTreeSet::new(),
        }));
        Ok(net_id)
    }

    // --- Unit presentation / movement -----------------------------------

    /// Moves `unit` to the walkable point nearest `to` and returns it.
    pub fn teleport_to(&mut self, unit: UnitId, to: Vec2) -> Result<Vec2, EffectError> {
        let pos = self.world.closest_walkable(to);
        let u = self.unit_mut(unit)?;
        u.pos = pos;
        u.stop_moving();
        u.dash = None;
        self.notify(ServerMsg::Teleport { unit: unit.0, pos: xy(pos) });
        Ok(pos)
    }

    /// Show or hide `unit` for every team. Its own team always sees it.
    pub fn set_visibility(&mut self, unit: UnitId, visible: bool) -> Result<(), EffectError> {
        let teams = self.world.teams();
        let u = self.unit_mut(unit)?;
        u.visible_to = if visible {
            teams.into_iter().chain([u.team]).collect()
        } else {
            BTreeSet::from([u.team])
        };
        self.notify(ServerMsg::Visibility { unit: unit.0, visible });
        Ok(())
    }

    pub fn face_direction(&mut self, unit: UnitId, dir: Vec2, instant: bool, turn_time: f32) -> Result<(), EffectError> {
        let u = self.unit_mut(unit)?;
        let dir = dir.normalize_or(u.facing);
        u.facing = dir;
        self.notify(ServerMsg::FaceDirection { unit: unit.0, dir: xy(dir), instant, turn_time });
        Ok(())
    }

    pub fn spell_animation(&mut self, unit: UnitId, name: &str) -> Result<(), EffectError> {
        self.unit_mut(unit)?.spell_animation = Some(name.to_string());
        self.notify(ServerMsg::SpellAnimation { unit: unit.0, name: name.to_string() });
        Ok(())
    }

    /// Replace the unit's animation overrides; an empty list restores defaults.
    pub fn set_animations(&mut self, unit: UnitId, names: Vec<String>) -> Result<(), EffectError> {
        self.unit_mut(unit)?.animation_overrides = names.clone();
        self.notify(ServerMsg::SetAnimation { unit: unit.0, names });
        Ok(())
    }

    pub fn set_model(&mut self, unit: UnitId, model: &str) -> Result<(), EffectError> {
        self.unit_mut(unit)?.model = model.to_string();
        self.notify(ServerMsg::SetModel { unit: unit.0, model: model.to_string() });
        Ok(())
    }

    pub fn dash_to_unit(&mut self, unit: UnitId, target: UnitId, params: DashParams) -> Result<(), EffectError> {
        if self.world.unit(target).is_none() {
            return Err(EffectError::UnknownUnit(target));
        }
        self.start_dash(unit, Target::Unit(target), params)
    }

    pub fn dash_to_location(&mut self, unit: UnitId, to: Vec2, params: DashParams) -> Result<(), EffectError> {
        let to = self.world.closest_walkable(to);
        self.start_dash(unit, Target::Point(to), params)
    }

    fn start_dash(&mut self, unit: UnitId, target: Target, params: DashParams) -> Result<(), EffectError> {
        let target_pos = self.resolve(target);
        let u = self.unit_mut(unit)?;
        u.stop_moving();
        if !params.keep_facing {
            u.facing = (target_pos - u.pos).normalize_or(u.facing);
        }
        u.dash = Some(Dash {
            target,
            speed: params.speed,
            follow_max_distance: params.follow_max_distance,
            back_distance: params.back_distance,
            travel_time: params.travel_time,
        });
        self.notify(ServerMsg::Dash {
            unit: unit.0,
            target_unit: target.unit().map(|t| t.0),
            target_pos: xy(target_pos),
            speed: params.speed,
            keep_facing: params.keep_facing,
            leap_height: params.leap_height,
            follow_max_distance: params.follow_max_distance,
            back_distance: params.back_distance,
            travel_time: params.travel_time,
        });
        Ok(())
    }

    /// Subtracts `amount` from the target's health (negative heals, clamped
    /// to `0..=max`) and returns the new value.
    pub fn deal_damage(&mut self, source: UnitId, target: UnitId, amount: i32) -> Result<i32, EffectError> {
        let u = self.unit_mut(target)?;
        u.hp.hp = u.hp.hp.saturating_sub(amount).clamp(0, u.hp.max);
        let hp_after = u.hp.hp;
        if hp_after == 0 {
            u.stop_moving();
            u.dash = None;
            log::info!("unit {:?} killed by {:?}", target, source);
        }
        self.notify(ServerMsg::Damage { source: source.0, target: target.0, amount, hp_after });
        Ok(hp_after)
    }

    // --- Messaging -------------------------------------------------------

    pub fn print_chat(&mut self, text: &str) {
        self.world.chat_log.push(text.to_string());
        self.outbox.push(Channel::Chat, ServerMsg::DebugMessage { text: text.to_string() });
    }

    /// Broadcast raw bytes given as hex (whitespace ignored).
    pub fn send_packet(&mut self, hex: &str) -> Result<(), EffectError> {
        let bytes = parse_hex(hex)?;
        log::debug!("raw packet injected ({} bytes)", bytes.len());
        self.notify(ServerMsg::Raw { bytes });
        Ok(())
    }

    // --- Scheduling ------------------------------------------------------

    /// One-shot callback after `duration` seconds, counted from the next tick.
    pub fn create_timer<F>(&mut self, duration: f32, callback: F) -> TimerHandle
    where
        F: FnOnce(&mut Effects<'_>) + 'static,
    {
        self.timers.schedule(duration, Box::new(callback))
    }

    pub fn set_cooldown(&mut self, owner: UnitId, slot: u8, value: f32) {
        self.requests.push(CooldownRequest {
            key: SpellKey { owner, slot },
            change: CooldownChange::Set(value),
        });
    }

    pub fn lower_cooldown(&mut self, owner: UnitId, slot: u8, delta: f32) {
        self.requests.push(CooldownRequest {
            key: SpellKey { owner, slot },
            change: CooldownChange::Lower(delta),
        });
    }

    pub(crate) fn notify_cooldown(&mut self, owner: UnitId, slot: u8, current: f32, max: f32) {
        self.notify(ServerMsg::SetCooldown { owner: owner.0, slot, current, max });
    }

    // --- Queries ---------------------------------------------------------

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.world.unit(id)
    }

    pub fn units_in_range(&self, center: Vec2, range: f32) -> Vec<UnitId> {
        self.world.units_in_range(center, range)
    }

    pub fn champions_in_range(&self, center: Vec2, range: f32) -> Vec<UnitId> {
        self.world.champions_in_range(center, range)
    }

    pub fn teams(&self) -> BTreeSet<Team> {
        self.world.teams()
    }

    pub fn is_walkable(&self, p: Vec2) -> bool {
        self.world.is_walkable(p)
    }

    /// Unknown units count as dead.
    pub fn is_dead(&self, id: UnitId) -> bool {
        self.world.unit(id).is_none_or(|u| !u.alive())
    }

    pub fn unit_kind(&self, id: UnitId) -> Option<UnitKind> {
        self.world.unit(id).map(|u| u.kind)
    }

    pub fn team_of(&self, id: UnitId) -> Option<Team> {
        self.world.unit(id).map(|u| u.team)
    }

    pub fn position_of(&self, id: UnitId) -> Option<Vec2> {
        self.world.unit(id).map(|u| u.pos)
    }

    /// Current position of a target; a vanished unit resolves to the origin.
    fn resolve(&self, target: Target) -> Vec2 {
        match target {
            Target::Point(p) => p,
            Target::Unit(u) => self.position_of(u).unwrap_or(Vec2::ZERO),
        }
    }
}

fn parse_hex(hex: &str) -> Result<Vec<u8>, EffectError> {
    let digits: Vec<u8> = hex.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(EffectError::InvalidHex(format!("odd digit count ({})", digits.len())));
    }
    digits
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| EffectError::InvalidHex(String::from_utf8_lossy(pair).into_owned()))
        })
        .collect()
}
