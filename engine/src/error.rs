use thiserror::Error;

use crate::party::Seat;

/// Why target resolution produced no target list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("no legal targets")]
    NoCandidates,
    #[error("target selection cancelled")]
    Cancelled,
}

/// Equip and unequip rejections. Nothing moves when one of these comes back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquipError {
    #[error("no item at index {0}")]
    NoSuchItem(usize),
    #[error("no party member at index {0}")]
    NoSuchMember(usize),
    #[error("not enough free '{slot}' slots (needs {needed}, has {free})")]
    NoFreeSlot { slot: String, needed: u32, free: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("turn order refers to missing seat {seat:?}")]
    MissingSeat { seat: Seat },
}
