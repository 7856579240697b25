//! Error taxonomy shared by the world and the board systems.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BusyOperation, CellCoord};

/// Reasons the board refuses a mutation.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardError {
    /// The target slot already holds a tile.
    #[error("slot {cell} is already occupied")]
    OccupiedSlot {
        /// Slot that was expected to be empty.
        cell: CellCoord,
    },
    /// The cell lies outside the configured board.
    #[error("cell {cell} lies outside the board")]
    OutOfBounds {
        /// Cell that was addressed.
        cell: CellCoord,
    },
    /// The source slot holds no tile.
    #[error("slot {cell} holds no tile")]
    EmptySlot {
        /// Slot that was expected to be occupied.
        cell: CellCoord,
    },
}

/// Returned when a long-running board operation is already in progress.
///
/// This is a "try again later" signal, never a failure of the board itself.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
#[error("{held} is in progress; retry once it completes")]
pub struct RejectedOperation {
    held: BusyOperation,
}

impl RejectedOperation {
    /// Creates a rejection naming the operation that currently holds the guard.
    #[must_use]
    pub const fn new(held: BusyOperation) -> Self {
        Self { held }
    }

    /// Operation that held the guard when the request arrived.
    #[must_use]
    pub const fn held(&self) -> BusyOperation {
        self.held
    }
}

/// Reasons a [`crate::GameConfig`] is refused.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The board must have at least one column and one row.
    #[error("board must not be empty (got {columns}x{rows})")]
    EmptyBoard {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// Matching needs at least two colors.
    #[error("palette needs at least 2 colors, got {len}")]
    PaletteTooSmall {
        /// Number of configured colors.
        len: usize,
    },
    /// Colors are stored as a byte-sized palette index.
    #[error("palette supports at most 255 colors, got {len}")]
    PaletteTooLarge {
        /// Number of configured colors.
        len: usize,
    },
    /// A committable match needs at least two tiles.
    #[error("minimum match length must be at least 2, got {length}")]
    MatchLengthTooShort {
        /// Configured minimum match length.
        length: usize,
    },
    /// A special spawn length can never be reached by a committable path.
    #[error("{kind} spawn length {length} is below the minimum match length {minimum}")]
    SpawnLengthBelowMinimum {
        /// Special tile the length belongs to.
        kind: &'static str,
        /// Configured spawn length.
        length: usize,
        /// Configured minimum match length.
        minimum: usize,
    },
    /// Both special tiles would compete for the same path length.
    #[error("area and color bomb spawn lengths must differ, both are {length}")]
    IdenticalSpawnLengths {
        /// Shared spawn length.
        length: usize,
    },
}
