//! Scenario schema for the simulation harness: units, their abilities, and a
//! timeline of commands issued at fixed ticks.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default = "default_ticks")]
    pub ticks: u32,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
    #[serde(default)]
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitSpec {
    pub id: u32,
    #[serde(default = "default_kind")]
    pub kind: String,
    pub team: u8,
    pub pos: [f32; 2],
    #[serde(default = "default_hp")]
    pub hp: i32,
    /// Ability names by slot index.
    #[serde(default)]
    pub spells: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Cast {
        at_tick: u32,
        unit: u32,
        slot: u8,
        pos: [f32; 2],
        #[serde(default)]
        target: Option<u32>,
    },
    LevelUp { at_tick: u32, unit: u32, slot: u8 },
    SetCooldown { at_tick: u32, unit: u32, slot: u8, value: f32 },
}

impl Command {
    pub fn at_tick(&self) -> u32 {
        match self {
            Command::Cast { at_tick, .. }
            | Command::LevelUp { at_tick, .. }
            | Command::SetCooldown { at_tick, .. } => *at_tick,
        }
    }
}

fn default_ticks() -> u32 { 300 }
fn default_kind() -> String { "champion".into() }
fn default_hp() -> i32 { 100 }

pub fn load_json(path: &Path) -> Result<Scenario> {
    let txt = std::fs::read_to_string(path).with_context(|| format!("read scenario: {}", path.display()))?;
    let scn: Scenario = serde_json::from_str(&txt).context("parse scenario json")?;
    Ok(scn)
}
