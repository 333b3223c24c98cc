//! Error types at the ability pipeline seams.

use thiserror::Error;

use crate::unit::UnitId;

/// Synchronous cast rejection. A rejected cast mutates nothing and emits no
/// notification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CastRejected {
    #[error("target {target:?} out of range ({distance:.0} > {range:.0})")]
    OutOfRange { target: UnitId, distance: f32, range: f32 },
    #[error("unknown unit {0:?}")]
    UnknownUnit(UnitId),
    #[error("unit {owner:?} has no ability in slot {slot}")]
    NoSuchSpell { owner: UnitId, slot: u8 },
    #[error("caster {0:?} is dead")]
    CasterDead(UnitId),
    #[error("slot {slot} not ready ({state})")]
    NotReady { slot: u8, state: &'static str },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpellError {
    #[error("no spell data for '{0}'")]
    MissingSpellData(String),
    #[error("unknown unit {0:?}")]
    UnknownUnit(UnitId),
    #[error("unit {owner:?} slot {slot} already holds an ability")]
    SlotOccupied { owner: UnitId, slot: u8 },
    #[error("unit {owner:?} has no ability in slot {slot}")]
    NoSuchSpell { owner: UnitId, slot: u8 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectError {
    #[error("unknown unit {0:?}")]
    UnknownUnit(UnitId),
    #[error("unit {0:?} has no free buff slot")]
    NoBuffSlot(UnitId),
    #[error("invalid hex packet: {0}")]
    InvalidHex(String),
}
