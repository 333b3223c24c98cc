//! Authoritative unit records: identity, team, transform, health, casting
//! flags, stats, and the buffs attached to them.

use glam::Vec2;
use std::collections::BTreeSet;

use crate::buff::Buff;
use crate::objects::Target;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnitKind {
    Champion,
    Minion,
    Turret,
    Inhibitor,
    Nexus,
    Placeable,
    Monster,
}

impl UnitKind {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_lowercase().as_str() {
            "champion" => UnitKind::Champion,
            "minion" => UnitKind::Minion,
            "turret" => UnitKind::Turret,
            "inhibitor" => UnitKind::Inhibitor,
            "nexus" => UnitKind::Nexus,
            "placeable" => UnitKind::Placeable,
            "monster" => UnitKind::Monster,
            _ => return None,
        })
    }

    #[inline]
    pub fn is_champion(self) -> bool { matches!(self, UnitKind::Champion) }
    #[inline]
    pub fn is_structure(self) -> bool {
        matches!(self, UnitKind::Turret | UnitKind::Inhibitor | UnitKind::Nexus)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Team {
    Blue,
    Purple,
    Neutral,
}

impl Team {
    /// Scenario/content team index: 1 = blue, 2 = purple, anything else neutral.
    pub fn from_index(i: u8) -> Self {
        match i {
            1 => Team::Blue,
            2 => Team::Purple,
            _ => Team::Neutral,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Health {
    pub hp: i32,
    pub max: i32,
}
impl Health {
    #[inline]
    pub fn alive(&self) -> bool { self.hp > 0 }
}

/// Per-slot resource costs mirrored from the unit's primary abilities,
/// indexed by slot.
#[derive(Clone, Debug, Default)]
pub struct Stats {
    pub mana_cost: Vec<f32>,
}

/// Active dash; the unit travels toward `target` until it arrives.
#[derive(Clone, Debug)]
pub struct Dash {
    pub target: Target,
    pub speed: f32,
    pub follow_max_distance: f32,
    pub back_distance: f32,
    pub travel_time: f32,
}

#[derive(Clone, Debug)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub team: Team,
    pub pos: Vec2,
    pub facing: Vec2,
    pub radius: f32,
    pub move_speed: f32,
    pub hp: Health,
    /// Server-side movement goal; cleared to pin the unit in place.
    pub waypoint: Option<Vec2>,
    pub dash: Option<Dash>,
    pub is_casting: bool,
    pub stats: Stats,
    pub buffs: Vec<Buff>,
    pub model: String,
    pub visible_to: BTreeSet<Team>,
    /// Animation overrides currently in effect.
    pub animation_overrides: Vec<String>,
    /// Last one-shot cast animation played.
    pub spell_animation: Option<String>,
}

impl Unit {
    pub fn new(id: UnitId, kind: UnitKind, team: Team, pos: Vec2, hp: i32) -> Self {
        Self {
            id,
            kind,
            team,
            pos,
            facing: Vec2::Y,
            radius: if kind.is_structure() { 90.0 } else { 35.0 },
            move_speed: 325.0,
            hp: Health { hp, max: hp },
            waypoint: None,
            dash: None,
            is_casting: false,
            stats: Stats::default(),
            buffs: Vec::new(),
            model: String::new(),
            visible_to: BTreeSet::from([team]),
            animation_overrides: Vec::new(),
            spell_animation: None,
        }
    }

    #[inline]
    pub fn alive(&self) -> bool { self.hp.alive() }

    pub fn move_to(&mut self, p: Vec2) {
        self.waypoint = Some(p);
    }

    /// Stop moving server-side; the unit holds its current position.
    pub fn stop_moving(&mut self) {
        self.waypoint = None;
    }

    /// First network buff slot not held by an active buff.
    pub fn free_buff_slot(&self, max_slots: u8) -> Option<u8> {
        (0..max_slots).find(|s| !self.buffs.iter().any(|b| b.slot == *s))
    }
}
