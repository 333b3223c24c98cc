//! Authoritative world container: units, cosmetic visuals and in-flight
//! hazards, plus the spatial and terrain queries abilities consume.

use glam::Vec2;
use std::collections::{BTreeMap, BTreeSet};

use crate::buff::BuffId;
use crate::nav::{NavQuery, OpenField};
use crate::objects::{Laser, Particle, Projectile, WorldObject};
use crate::unit::{Team, Unit, UnitId};

/// First id handed out for server-spawned objects.
pub const FIRST_NET_ID: u32 = 0x4000_0001;

pub struct World {
    pub units: BTreeMap<UnitId, Unit>,
    pub particles: BTreeMap<u32, Particle>,
    pub projectiles: BTreeMap<u32, Projectile>,
    pub lasers: BTreeMap<u32, Laser>,
    /// Objects registered this tick; eligible from the next tick.
    staged: Vec<WorldObject>,
    nav: Box<dyn NavQuery>,
    next_net_id: u32,
    next_buff_id: u32,
    pub max_buff_slots: u8,
    /// Chat lines broadcast through the facade, oldest first.
    pub chat_log: Vec<String>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(Box::new(OpenField), 64)
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("units", &self.units.len())
            .field("particles", &self.particles.len())
            .field("projectiles", &self.projectiles.len())
            .field("lasers", &self.lasers.len())
            .field("staged", &self.staged.len())
            .finish_non_exhaustive()
    }
}

impl World {
    pub fn new(nav: Box<dyn NavQuery>, max_buff_slots: u8) -> Self {
        Self {
            units: BTreeMap::new(),
            particles: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            lasers: BTreeMap::new(),
            staged: Vec::new(),
            nav,
            next_net_id: FIRST_NET_ID,
            next_buff_id: 1,
            max_buff_slots,
            chat_log: Vec::new(),
        }
    }

    pub fn spawn(&mut self, unit: Unit) -> UnitId {
        let id = unit.id;
        if self.units.insert(id, unit).is_some() {
            log::warn!("world: unit {:?} replaced", id);
        }
        id
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Fresh network id; honours a caller-reserved id when it is unused.
    pub fn claim_net_id(&mut self, preferred: Option<u32>) -> u32 {
        if let Some(id) = preferred
            && id != 0
            && !self.net_id_in_use(id)
        {
            return id;
        }
        loop {
            let id = self.next_net_id;
            self.next_net_id = self.next_net_id.wrapping_add(1).max(FIRST_NET_ID);
            if !self.net_id_in_use(id) {
                return id;
            }
        }
    }

    fn net_id_in_use(&self, id: u32) -> bool {
        self.particles.contains_key(&id)
            || self.projectiles.contains_key(&id)
            || self.lasers.contains_key(&id)
            || self.staged.iter().any(|o| match o {
                WorldObject::Projectile(p) => p.net_id == id,
                WorldObject::Laser(l) => l.net_id == id,
            })
    }

    pub(crate) fn next_buff_id(&mut self) -> BuffId {
        let id = BuffId(self.next_buff_id);
        self.next_buff_id += 1;
        id
    }

    /// Register a hazard; it becomes eligible for simulation next tick.
    pub fn add_object(&mut self, obj: WorldObject) {
        self.staged.push(obj);
    }

    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    pub fn promote_staged(&mut self) {
        for obj in self.staged.drain(..) {
            match obj {
                WorldObject::Projectile(p) => {
                    self.projectiles.insert(p.net_id, p);
                }
                WorldObject::Laser(l) => {
                    self.lasers.insert(l.net_id, l);
                }
            }
        }
    }

    /// Live units within `range` of `center`, in id order.
    pub fn units_in_range(&self, center: Vec2, range: f32) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|u| u.alive() && u.pos.distance(center) <= range)
            .map(|u| u.id)
            .collect()
    }

    pub fn champions_in_range(&self, center: Vec2, range: f32) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|u| u.kind.is_champion() && u.alive() && u.pos.distance(center) <= range)
            .map(|u| u.id)
            .collect()
    }

    pub fn teams(&self) -> BTreeSet<Team> {
        self.units.values().map(|u| u.team).collect()
    }

    pub fn is_walkable(&self, p: Vec2) -> bool {
        self.nav.is_walkable(p)
    }

    pub fn closest_walkable(&self, p: Vec2) -> Vec2 {
        self.nav.closest_walkable(p)
    }
}
