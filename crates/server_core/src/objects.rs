//! World objects spawned by abilities: particles, projectiles, lasers.

use glam::Vec2;

use crate::unit::UnitId;

/// Where an effect is aimed: a unit (tracked as it moves) or a fixed point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Target {
    Unit(UnitId),
    Point(Vec2),
}

impl Target {
    pub fn unit(&self) -> Option<UnitId> {
        match self {
            Target::Unit(u) => Some(*u),
            Target::Point(_) => None,
        }
    }
}

/// Ability slot owned by a unit; key of the spell table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpellKey {
    pub owner: UnitId,
    pub slot: u8,
}

/// Cosmetic visual. Carries no gameplay state.
#[derive(Clone, Debug)]
pub struct Particle {
    pub net_id: u32,
    pub owner: UnitId,
    pub name: String,
    pub target: Target,
    pub size: f32,
    pub bone: String,
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub net_id: u32,
    pub owner: UnitId,
    /// Ability resolving effects on impact.
    pub spell: SpellKey,
    pub ability_id: u32,
    pub name: String,
    pub pos: Vec2,
    pub target: Target,
    pub speed: f32,
    pub width: f32,
    pub flags: u32,
    /// Simulated but never replicated.
    pub server_only: bool,
}

/// Instant line hazard from `from` to `to`. Always server-only.
#[derive(Clone, Debug)]
pub struct Laser {
    pub net_id: u32,
    pub owner: UnitId,
    pub spell: SpellKey,
    pub from: Vec2,
    pub to: Vec2,
    pub width: f32,
    pub flags: u32,
    /// Resolve once on the first eligible tick; otherwise the laser persists
    /// while its ability is casting or channeling, hitting each unit once.
    pub affect_as_cast_is_over: bool,
    pub hit: std::collections::BTreeSet<UnitId>,
}

/// Object registered with the world but not yet eligible for simulation.
#[derive(Clone, Debug)]
pub enum WorldObject {
    Projectile(Projectile),
    Laser(Laser),
}
