//! Authoritative hazard stepping: projectile travel and contact, laser
//! resolution. Impacts are returned for the owning Spell to resolve.

use glam::Vec2;
use std::collections::BTreeSet;

use crate::combat::are_hostile;
use crate::objects::{Projectile, SpellKey, Target};
use crate::unit::{Team, UnitId};
use crate::world::World;

#[derive(Debug, Clone)]
pub struct Impact {
    pub spell: SpellKey,
    pub target: UnitId,
    pub projectile: Option<Projectile>,
}

#[derive(Debug, Default)]
pub struct ProjectileStep {
    pub impacts: Vec<Impact>,
    /// Projectiles done this tick (hit, arrived, or lost their target).
    pub finished: Vec<u32>,
}

/// Closest point on segment `a..b` to `c` lies within `radius`.
#[inline]
pub fn segment_hits_circle(a: Vec2, b: Vec2, c: Vec2, radius: f32) -> bool {
    segment_param(a, b, c, radius).is_some()
}

/// Parameter along `a..b` of the point closest to `c`, when within `radius`.
fn segment_param(a: Vec2, b: Vec2, c: Vec2, radius: f32) -> Option<f32> {
    let ab = b - a;
    let len2 = ab.length_squared();
    let t = if len2 <= 1e-12 { 0.0 } else { ((c - a).dot(ab) / len2).clamp(0.0, 1.0) };
    let closest = a + ab * t;
    ((closest - c).length_squared() <= radius * radius).then_some(t)
}

fn can_hit(world: &World, owner: UnitId, owner_team: Option<Team>, id: UnitId) -> bool {
    if id == owner {
        return false;
    }
    match (world.unit(id), owner_team) {
        (Some(u), Some(team)) => u.alive() && are_hostile(team, u.team),
        (Some(u), None) => u.alive(),
        (None, _) => false,
    }
}

/// Advance every eligible projectile by `dt` seconds.
pub fn step_projectiles(world: &mut World, dt: f32) -> ProjectileStep {
    let mut out = ProjectileStep::default();
    let ids: Vec<u32> = world.projectiles.keys().copied().collect();
    for id in ids {
        let Some(p) = world.projectiles.get(&id) else { continue };
        let owner_team = world.unit(p.owner).map(|u| u.team);
        let goal = match p.target {
            Target::Point(v) => v,
            Target::Unit(u) => match world.unit(u) {
                Some(t) if t.alive() => t.pos,
                _ => {
                    out.finished.push(id);
                    continue;
                }
            },
        };
        let p0 = p.pos;
        let to_goal = goal - p0;
        let travel = p.speed.max(0.0) * dt;
        let arrived = to_goal.length() <= travel;
        let p1 = if arrived { goal } else { p0 + to_goal.normalize_or_zero() * travel };

        let hit = match p.target {
            Target::Unit(u) => arrived.then_some(u),
            Target::Point(_) => {
                // First hostile along the swept segment.
                let half = p.width * 0.5;
                world
                    .units
                    .values()
                    .filter(|u| can_hit(world, p.owner, owner_team, u.id))
                    .filter_map(|u| segment_param(p0, p1, u.pos, u.radius + half).map(|t| (t, u.id)))
                    .min_by(|a, b| a.0.total_cmp(&b.0))
                    .map(|(_, id)| id)
            }
        };

        if let Some(target) = hit {
            let mut snap = p.clone();
            snap.pos = p1;
            out.impacts.push(Impact { spell: snap.spell, target, projectile: Some(snap) });
            out.finished.push(id);
            metrics::counter!("projectile.impacts_total").increment(1);
        } else if arrived {
            out.finished.push(id);
        } else if let Some(p) = world.projectiles.get_mut(&id) {
            p.pos = p1;
        }
    }
    out
}

/// Resolve eligible lasers. `active` holds spells still casting or
/// channeling. Finished lasers are removed here; they were never replicated.
pub fn step_lasers(world: &mut World, active: &BTreeSet<SpellKey>) -> Vec<Impact> {
    let mut impacts = Vec::new();
    let mut remove = Vec::new();
    let mut marked = Vec::new();
    for (id, l) in &world.lasers {
        let casting = active.contains(&l.spell);
        if l.affect_as_cast_is_over && casting {
            continue;
        }
        if !l.affect_as_cast_is_over && !casting {
            remove.push(*id);
            continue;
        }
        let owner_team = world.unit(l.owner).map(|u| u.team);
        let half = l.width * 0.5;
        let hits: Vec<UnitId> = world
            .units
            .values()
            .filter(|u| !l.hit.contains(&u.id) && can_hit(world, l.owner, owner_team, u.id))
            .filter(|u| segment_hits_circle(l.from, l.to, u.pos, u.radius + half))
            .map(|u| u.id)
            .collect();
        impacts.extend(hits.iter().map(|t| Impact { spell: l.spell, target: *t, projectile: None }));
        if l.affect_as_cast_is_over {
            remove.push(*id);
        } else if !hits.is_empty() {
            marked.push((*id, hits));
        }
    }
    for id in remove {
        world.lasers.remove(&id);
    }
    // Persistent lasers hit each unit once.
    for (id, hits) in marked {
        if let Some(l) = world.lasers.get_mut(&id) {
            l.hit.extend(hits);
        }
    }
    impacts
}
