//! Simulation server configuration (tick length, slot layout, replication
//! queue depth) from data/config/server.toml with env overrides.

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerCfg {
    /// Fixed simulation step in milliseconds.
    pub tick_ms: u32,
    /// Slots `0..primary_slots` are the primary abilities (cooldown HUD, mana cost stats).
    pub primary_slots: u8,
    /// Network buff slots available per unit.
    pub max_buff_slots: u8,
    /// Bounded depth of the in-process replication channel.
    pub transport_capacity: usize,
}

impl Default for ServerCfg {
    fn default() -> Self {
        Self {
            tick_ms: 33,
            primary_slots: 4,
            max_buff_slots: 64,
            transport_capacity: 4096,
        }
    }
}

pub fn load_default() -> Result<ServerCfg> {
    let path = crate::loader::data_root().join("config/server.toml");
    let mut cfg = if path.is_file() {
        let txt = std::fs::read_to_string(&path)
            .with_context(|| format!("read {}", path.display()))?;
        toml::from_str::<ServerToml>(&txt)
            .map(|t| t.server)
            .context("parse server TOML")?
    } else {
        ServerCfg::default()
    };
    if let Some(ms) = std::env::var("SIM_TICK_MS").ok().and_then(|v| v.parse().ok()) {
        cfg.tick_ms = ms;
    }
    if let Some(cap) = std::env::var("SIM_TRANSPORT_CAPACITY").ok().and_then(|v| v.parse().ok()) {
        cfg.transport_capacity = cap;
    }
    if cfg.tick_ms == 0 {
        anyhow::bail!("server config: tick_ms must be positive");
    }
    Ok(cfg)
}

#[derive(Debug, Clone, Deserialize)]
struct ServerToml {
    #[serde(default)]
    pub server: ServerCfg,
}
