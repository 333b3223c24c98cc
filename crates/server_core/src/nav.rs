//! Terrain query seam. The simulation never authorizes a position the
//! navigation layer reports as unwalkable.

use glam::Vec2;
use std::collections::{BTreeSet, HashSet, VecDeque};

pub trait NavQuery {
    fn is_walkable(&self, p: Vec2) -> bool;
    /// Nearest walkable point to `p` (`p` itself when already walkable).
    fn closest_walkable(&self, p: Vec2) -> Vec2;
}

/// Unbounded flat terrain: everything is walkable.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenField;

impl NavQuery for OpenField {
    fn is_walkable(&self, _p: Vec2) -> bool {
        true
    }
    fn closest_walkable(&self, p: Vec2) -> Vec2 {
        p
    }
}

/// Uniform grid of blocked cells over otherwise open terrain.
#[derive(Debug, Clone)]
pub struct GridNav {
    cell: f32,
    blocked: BTreeSet<(i32, i32)>,
    /// Search cap (in cells) for `closest_walkable`.
    max_radius: i32,
}

impl GridNav {
    pub fn new(cell: f32) -> Self {
        Self { cell: cell.max(1.0), blocked: BTreeSet::new(), max_radius: 64 }
    }

    pub fn block_rect(&mut self, min: Vec2, max: Vec2) {
        let (x0, y0) = self.cell_of(min);
        let (x1, y1) = self.cell_of(max);
        for x in x0..=x1 {
            for y in y0..=y1 {
                self.blocked.insert((x, y));
            }
        }
    }

    #[inline]
    fn cell_of(&self, p: Vec2) -> (i32, i32) {
        ((p.x / self.cell).floor() as i32, (p.y / self.cell).floor() as i32)
    }

    #[inline]
    fn center(&self, c: (i32, i32)) -> Vec2 {
        Vec2::new((c.0 as f32 + 0.5) * self.cell, (c.1 as f32 + 0.5) * self.cell)
    }
}

impl NavQuery for GridNav {
    fn is_walkable(&self, p: Vec2) -> bool {
        !self.blocked.contains(&self.cell_of(p))
    }

    fn closest_walkable(&self, p: Vec2) -> Vec2 {
        let start = self.cell_of(p);
        if !self.blocked.contains(&start) {
            return p;
        }
        // BFS over 4-neighbours; ties go to the cell center nearest `p`.
        let mut seen = HashSet::from([start]);
        let mut q = VecDeque::from([(start, 0)]);
        let mut best: Option<(f32, Vec2)> = None;
        let mut best_depth = i32::MAX;
        while let Some((c, depth)) = q.pop_front() {
            if depth > best_depth || depth > self.max_radius {
                break;
            }
            if !self.blocked.contains(&c) {
                let center = self.center(c);
                let d = center.distance_squared(p);
                if best.is_none_or(|(bd, _)| d < bd) {
                    best = Some((d, center));
                }
                best_depth = depth;
                continue;
            }
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let n = (c.0 + dx, c.1 + dy);
                if seen.insert(n) {
                    q.push_back((n, depth + 1));
                }
            }
        }
        match best {
            Some((_, v)) => v,
            None => {
                log::warn!("nav: no walkable cell within {} of {:?}", self.max_radius, p);
                p
            }
        }
    }
}
