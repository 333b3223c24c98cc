//! Server-side unit motion: waypoint walking and dashes.

use crate::objects::Target;
use crate::world::World;

pub fn step(world: &mut World, dt: f32) {
    let ids: Vec<_> = world.units.keys().copied().collect();
    for id in ids {
        let Some(u) = world.units.get(&id) else { continue };
        if !u.alive() {
            continue;
        }
        if let Some(dash) = u.dash.clone() {
            let goal = match dash.target {
                Target::Point(p) => Some(p),
                Target::Unit(t) => world.unit(t).filter(|t| t.alive()).map(|t| t.pos),
            };
            let Some(u) = world.units.get_mut(&id) else { continue };
            let Some(goal) = goal else {
                u.dash = None;
                continue;
            };
            let d = goal - u.pos;
            if dash.follow_max_distance > 0.0 && d.length() > dash.follow_max_distance {
                log::debug!("dash of {:?} broke: target beyond follow distance", id);
                u.dash = None;
                continue;
            }
            let stop = dash.back_distance.max(0.0);
            let remaining = (d.length() - stop).max(0.0);
            let travel = dash.speed.max(0.0) * dt;
            if remaining <= travel {
                u.pos += d.normalize_or_zero() * remaining;
                u.dash = None;
            } else {
                u.pos += d.normalize_or_zero() * travel;
            }
            continue;
        }
        if u.is_casting {
            continue;
        }
        let Some(wp) = u.waypoint else { continue };
        let (speed, pos) = (u.move_speed, u.pos);
        let walkable_step = {
            let d = wp - pos;
            let travel = speed * dt;
            if d.length() <= travel { wp } else { pos + d.normalize_or_zero() * travel }
        };
        let blocked = !world.is_walkable(walkable_step);
        let Some(u) = world.units.get_mut(&id) else { continue };
        if blocked {
            u.stop_moving();
            continue;
        }
        u.pos = walkable_step;
        if u.pos == wp {
            u.stop_moving();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{Dash, Team, Unit, UnitId, UnitKind};
    use glam::Vec2;

    #[test]
    fn dash_arrives_and_clears() {
        let mut w = World::default();
        let mut u = Unit::new(UnitId(1), UnitKind::Champion, Team::Blue, Vec2::ZERO, 100);
        u.dash = Some(Dash {
            target: Target::Point(Vec2::new(100.0, 0.0)),
            speed: 1000.0,
            follow_max_distance: 0.0,
            back_distance: 0.0,
            travel_time: 0.0,
        });
        w.spawn(u);
        step(&mut w, 0.05);
        assert!((w.units[&UnitId(1)].pos.x - 50.0).abs() < 1e-3);
        step(&mut w, 0.05);
        let u = &w.units[&UnitId(1)];
        assert!((u.pos.x - 100.0).abs() < 1e-3);
        assert!(u.dash.is_none());
    }

    #[test]
    fn casting_units_hold_position() {
        let mut w = World::default();
        let mut u = Unit::new(UnitId(1), UnitKind::Champion, Team::Blue, Vec2::ZERO, 100);
        u.move_to(Vec2::new(500.0, 0.0));
        u.is_casting = true;
        w.spawn(u);
        step(&mut w, 0.5);
        assert_eq!(w.units[&UnitId(1)].pos, Vec2::ZERO);
    }
}
