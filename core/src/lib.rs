#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dotlink puzzle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the board systems. Systems plan [`Command`] values
//! describing desired board mutations, the world executes those commands via
//! its `apply` entry point, and then reports [`Event`] values describing what
//! actually changed. Events double as the effect list a presentation layer may
//! animate; nothing in the logic ever waits on that playback.

mod config;
mod error;
mod guard;

pub use config::{ColorBombTrigger, GameConfig, Palette, SpawnRuleMode, SpawnRules};
pub use error::{BoardError, ConfigError, RejectedOperation};
pub use guard::{BusyGuards, BusyOperation, GuardToken};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Commands that express all permissible board mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Places a freshly created ordinary tile into an empty slot.
    SpawnTile {
        /// Slot that receives the tile.
        cell: CellCoord,
        /// Color assigned to the new tile.
        color: TileColor,
    },
    /// Clears the ordinary tile occupying the slot. Special tiles are exempt.
    ClearTile {
        /// Slot to clear.
        cell: CellCoord,
    },
    /// Relocates a tile into an empty slot of the board.
    MoveTile {
        /// Slot currently holding the tile.
        from: CellCoord,
        /// Empty slot that receives the tile.
        to: CellCoord,
    },
    /// Replaces the ordinary tile at the slot with a new special tile.
    SpawnSpecial {
        /// Slot that receives the special tile.
        cell: CellCoord,
        /// Kind of special tile to create.
        kind: SpecialKind,
        /// Color carried by the special tile.
        color: TileColor,
    },
    /// Removes the special tile at the slot as the final step of its activation.
    DetonateSpecial {
        /// Slot holding the special tile.
        cell: CellCoord,
    },
    /// Advances an ordinary tile's color to the next palette entry.
    CycleColor {
        /// Slot holding the tile to recolor.
        cell: CellCoord,
        /// Number of colors in the active palette.
        palette_len: u8,
    },
}

/// Effect descriptors reported by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A new ordinary tile entered the board.
    TileSpawned {
        /// Tile that was created, including its final cell.
        tile: Tile,
    },
    /// An ordinary tile was removed from the board.
    TileCleared {
        /// Tile that was destroyed.
        tile: Tile,
    },
    /// A generic clear targeted a special tile and left it in place.
    ClearSkipped {
        /// Special tile that survived the clear.
        tile: Tile,
    },
    /// A tile moved down its column during compaction.
    TileFell {
        /// Tile after the move.
        tile: Tile,
        /// Cell the tile occupied before the move.
        from: CellCoord,
    },
    /// A special tile was created.
    SpecialSpawned {
        /// Special tile that was created.
        tile: Tile,
    },
    /// A special tile was removed by its own activation.
    SpecialDetonated {
        /// Special tile that was removed.
        tile: Tile,
    },
    /// An ordinary tile changed color.
    TileRecolored {
        /// Tile after the color change.
        tile: Tile,
        /// Color the tile carried before.
        previous: TileColor,
    },
    /// A mutation was refused because it would break a board invariant.
    PlacementRejected {
        /// Cell named by the refused command.
        cell: CellCoord,
        /// Reason the board refused the mutation.
        reason: BoardError,
    },
    /// The cascade finished and the board is stable again.
    CascadeCompleted {
        /// Number of tiles that fell during compaction.
        fallen: u32,
        /// Number of tiles created during refill.
        spawned: u32,
    },
}

/// Location of a single board slot expressed as column and row coordinates.
///
/// Row zero is the top of the board; gravity pulls toward higher rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Computes the Chebyshev (king-move) distance between two cell coordinates.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column()
            .abs_diff(other.column())
            .max(self.row().abs_diff(other.row()))
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Orthogonal neighbours in north, east, south, west order.
    ///
    /// Neighbours that would underflow are omitted; upper bounds are the
    /// caller's concern since probing beyond the board yields no tile.
    pub fn neighbours(self) -> impl Iterator<Item = CellCoord> {
        let north = self
            .row
            .checked_sub(1)
            .map(|row| CellCoord::new(self.column, row));
        let east = self
            .column
            .checked_add(1)
            .map(|column| CellCoord::new(column, self.row));
        let south = self
            .row
            .checked_add(1)
            .map(|row| CellCoord::new(self.column, row));
        let west = self
            .column
            .checked_sub(1)
            .map(|column| CellCoord::new(column, self.row));
        [north, east, south, west].into_iter().flatten()
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Unique identifier assigned to a tile by the slot pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    /// Creates a new tile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index into the configured palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileColor(u8);

impl TileColor {
    /// Creates a color referring to the palette entry at `index`.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Palette index of the color.
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.0
    }

    /// Next palette entry, wrapping at `palette_len`.
    #[must_use]
    pub fn cycled(self, palette_len: u8) -> Self {
        if palette_len == 0 {
            return self;
        }
        Self((self.0 % palette_len + 1) % palette_len)
    }
}

/// Special behaviour attached to a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialKind {
    /// Ordinary tile that participates in paths.
    #[default]
    None,
    /// Clears the surrounding 3x3 block when activated.
    AreaBomb,
    /// Clears every tile of its recorded color when activated.
    ColorBomb,
}

impl SpecialKind {
    /// Reports whether the kind marks a special tile.
    #[must_use]
    pub const fn is_special(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Immutable description of a tile and the slot it occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    id: TileId,
    cell: CellCoord,
    color: TileColor,
    special: SpecialKind,
}

impl Tile {
    /// Creates an ordinary tile.
    #[must_use]
    pub const fn new(id: TileId, cell: CellCoord, color: TileColor) -> Self {
        Self {
            id,
            cell,
            color,
            special: SpecialKind::None,
        }
    }

    /// Creates a special tile. For a color bomb `color` is its activation color.
    #[must_use]
    pub const fn special(id: TileId, cell: CellCoord, kind: SpecialKind, color: TileColor) -> Self {
        Self {
            id,
            cell,
            color,
            special: kind,
        }
    }

    /// Identifier of the tile.
    #[must_use]
    pub const fn id(&self) -> TileId {
        self.id
    }

    /// Cell the tile occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Color of the tile.
    #[must_use]
    pub const fn color(&self) -> TileColor {
        self.color
    }

    /// Special kind of the tile.
    #[must_use]
    pub const fn special_kind(&self) -> SpecialKind {
        self.special
    }

    /// Reports whether the tile is exempt from ordinary matching and clearing.
    #[must_use]
    pub const fn is_special(&self) -> bool {
        self.special.is_special()
    }

    /// Returns a copy of the tile relocated to `cell`.
    #[must_use]
    pub const fn at(self, cell: CellCoord) -> Self {
        Self { cell, ..self }
    }

    /// Returns a copy of the tile carrying `color`.
    #[must_use]
    pub const fn with_color(self, color: TileColor) -> Self {
        Self { color, ..self }
    }
}

/// Content of a single board slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Slot {
    /// No tile occupies the slot.
    #[default]
    Empty,
    /// The slot holds the tile.
    Occupied(Tile),
}

impl Slot {
    /// Tile held by the slot, if any.
    #[must_use]
    pub const fn tile(&self) -> Option<&Tile> {
        match self {
            Self::Empty => None,
            Self::Occupied(tile) => Some(tile),
        }
    }

    /// Reports whether the slot is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Read-only view into the dense board matrix.
#[derive(Clone, Copy, Debug)]
pub struct BoardView<'a> {
    slots: &'a [Slot],
    columns: u32,
    rows: u32,
}

impl<'a> BoardView<'a> {
    /// Captures a new board view backed by the provided row-major slot slice.
    #[must_use]
    pub fn new(slots: &'a [Slot], columns: u32, rows: u32) -> Self {
        debug_assert_eq!(
            slots.len() as u64,
            u64::from(columns) * u64::from(rows),
            "slot slice must match the board dimensions"
        );
        Self {
            slots,
            columns,
            rows,
        }
    }

    /// Number of columns on the board.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows on the board.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies on the board.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Returns the tile occupying the provided cell. Cells beyond the board hold no tile.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        self.index(cell)
            .and_then(|index| self.slots.get(index))
            .and_then(Slot::tile)
            .copied()
    }

    /// Signed probe for callers that step past the board edges.
    #[must_use]
    pub fn tile_signed(&self, column: i64, row: i64) -> Option<Tile> {
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        self.tile(CellCoord::new(column, row))
    }

    /// Reports whether the cell is on the board and empty.
    #[must_use]
    pub fn is_empty(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.slots.get(index))
            .is_some_and(Slot::is_empty)
    }

    /// Iterates every cell in row-major order alongside its tile.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, Option<Tile>)> + 'a {
        let columns = self.columns;
        let slots = self.slots;
        (0..self.rows)
            .flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
            .zip(slots)
            .map(|(cell, slot)| (cell, slot.tile().copied()))
    }

    /// Iterates the occupied slots in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + 'a {
        let slots = self.slots;
        slots.iter().filter_map(|slot| slot.tile().copied())
    }

    /// Number of empty slots on the board.
    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_empty()).count()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
