//! `net_core`: outbound notification schema + replication plumbing.
//!
//! Scope
//! - `msg::ServerMsg` and its binary codec
//! - Channel-tagged framing
//! - A broadcast-only `Transport` seam with an in-proc loopback
//!
#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod channel;
pub mod codec;
pub mod frame;
pub mod msg;
pub mod transport;

/// Logical delivery channel a message is broadcast on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Channel {
    /// Gameplay state changes, server to client.
    S2C = 0,
    /// Chat/debug text.
    Chat = 1,
    /// Cosmetic traffic that may be shed under load.
    LowPriority = 2,
}

impl Channel {
    pub fn from_u8(v: u8) -> anyhow::Result<Self> {
        Ok(match v {
            0 => Channel::S2C,
            1 => Channel::Chat,
            2 => Channel::LowPriority,
            other => anyhow::bail!("unknown channel id: {other}"),
        })
    }
}
