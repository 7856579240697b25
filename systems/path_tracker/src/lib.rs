#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Path-building state machine driven by discrete gesture events.
//!
//! The tracker validates every step of the player's connection as it grows:
//! each new tile must share an edge with the current tail, carry the color
//! locked in by the first tile, and not already be part of the path. Touching
//! the second-to-last tile again retracts the tail instead.

use std::fmt;

use dotlink_core::{BoardView, CellCoord, ColorBombTrigger, GameConfig, SpecialKind, Tile, TileColor};
use thiserror::Error;

/// States of the path-building machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackerState {
    /// No gesture in progress.
    Idle,
    /// A gesture is building a path.
    Building,
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Building => f.write_str("building"),
        }
    }
}

/// Operations a caller may request from the tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathOperation {
    /// Begin a new path.
    Start,
    /// Extend or retract the current path.
    Extend,
    /// Finish the gesture and hand the path over.
    Commit,
    /// Discard the gesture.
    Abort,
}

impl fmt::Display for PathOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::Extend => f.write_str("extend"),
            Self::Commit => f.write_str("commit"),
            Self::Abort => f.write_str("abort"),
        }
    }
}

/// Errors reported by the tracker. None of them change tracker state.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    /// The operation is not valid in the current state.
    #[error("cannot {operation} a path while {state}")]
    InvalidTransition {
        /// State the tracker was in.
        state: TrackerState,
        /// Operation that was requested.
        operation: PathOperation,
    },
}

/// Gesture events resolved to board cells by the input collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathInput {
    /// Pointer pressed over the cell.
    Begin(CellCoord),
    /// Pointer dragged over the cell.
    Extend(CellCoord),
    /// Pointer released.
    End,
    /// Gesture interrupted.
    Abort,
}

/// Result of offering a tile to a path under construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExtendOutcome {
    /// The tile became the new tail.
    Appended,
    /// The tile was the second-to-last element; the tail was removed.
    Retracted,
    /// The tile failed the adjacency, color, or uniqueness rules.
    Ignored,
}

/// Response to a gesture event handled through [`PathTracker::handle`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackerResponse {
    /// A path was started on the tile.
    Started(Tile),
    /// The path was offered a tile.
    Extended(ExtendOutcome),
    /// The gesture ended; holds the path when it was long enough to resolve.
    Committed(Option<CommittedPath>),
    /// The gesture was discarded.
    Aborted,
    /// The event named a cell that cannot take part in a path.
    Ignored,
}

/// Path handed over for resolution after a gesture ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommittedPath {
    tiles: Vec<Tile>,
    color: TileColor,
}

impl CommittedPath {
    /// Creates a committed path from tiles in drawing order.
    ///
    /// Returns `None` for an empty tile list.
    #[must_use]
    pub fn new(tiles: Vec<Tile>, color: TileColor) -> Option<Self> {
        if tiles.is_empty() {
            return None;
        }
        Some(Self { tiles, color })
    }

    /// Tiles in drawing order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Cells in drawing order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.tiles.iter().map(Tile::cell)
    }

    /// Color locked by the first tile of the path.
    #[must_use]
    pub const fn color(&self) -> TileColor {
        self.color
    }

    /// Number of tiles in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always false; committed paths hold at least one tile.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Last-drawn tile.
    #[must_use]
    pub fn last(&self) -> Option<&Tile> {
        self.tiles.last()
    }
}

/// Configuration parameters required to construct the tracker.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    min_match_length: usize,
    color_bomb_trigger: ColorBombTrigger,
}

impl Config {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(min_match_length: usize, color_bomb_trigger: ColorBombTrigger) -> Self {
        Self {
            min_match_length,
            color_bomb_trigger,
        }
    }
}

impl From<&GameConfig> for Config {
    fn from(config: &GameConfig) -> Self {
        Self::new(config.spawn_rules.min_match_length, config.color_bomb_trigger)
    }
}

/// Stateful path builder for a single gesture at a time.
#[derive(Debug)]
pub struct PathTracker {
    config: Config,
    state: TrackerState,
    path: Vec<Tile>,
    locked_color: Option<TileColor>,
}

impl PathTracker {
    /// Creates an idle tracker.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: TrackerState::Idle,
            path: Vec::new(),
            locked_color: None,
        }
    }

    /// Current state of the machine.
    #[must_use]
    pub const fn state(&self) -> TrackerState {
        self.state
    }

    /// Path built so far, in drawing order.
    #[must_use]
    pub fn path(&self) -> &[Tile] {
        &self.path
    }

    /// Color locked in by the first tile of the current path.
    #[must_use]
    pub const fn locked_color(&self) -> Option<TileColor> {
        self.locked_color
    }

    /// Begins a path on `tile`.
    ///
    /// Returns `Ok(false)` when the tile cannot seed a path (special tiles).
    pub fn start(&mut self, tile: Tile) -> Result<bool, TrackerError> {
        self.expect_state(TrackerState::Idle, PathOperation::Start)?;
        if tile.is_special() {
            log::debug!("refusing to start a path on special tile at {}", tile.cell());
            return Ok(false);
        }

        self.path.clear();
        self.path.push(tile);
        self.locked_color = Some(tile.color());
        self.state = TrackerState::Building;
        log::debug!("path started at {}", tile.cell());
        Ok(true)
    }

    /// Offers `tile` to the path, appending, retracting, or ignoring it.
    pub fn extend(&mut self, tile: Tile) -> Result<ExtendOutcome, TrackerError> {
        self.expect_state(TrackerState::Building, PathOperation::Extend)?;

        if let [.., second_to_last, _] = self.path.as_slice() {
            if second_to_last.id() == tile.id() {
                let _ = self.path.pop();
                return Ok(ExtendOutcome::Retracted);
            }
        }

        if !self.accepts(&tile) {
            return Ok(ExtendOutcome::Ignored);
        }

        self.path.push(tile);
        Ok(ExtendOutcome::Appended)
    }

    /// Ends the gesture, returning the path when it is long enough to resolve.
    ///
    /// The tracker returns to idle and forgets the path either way.
    pub fn commit(&mut self) -> Result<Option<CommittedPath>, TrackerError> {
        self.expect_state(TrackerState::Building, PathOperation::Commit)?;
        let tiles = std::mem::take(&mut self.path);
        let color = self.locked_color.take();
        self.state = TrackerState::Idle;

        if tiles.len() < self.config.min_match_length {
            log::debug!("discarding short path of {} tiles", tiles.len());
            return Ok(None);
        }
        Ok(color.and_then(|color| CommittedPath::new(tiles, color)))
    }

    /// Discards the gesture without touching the board.
    pub fn abort(&mut self) -> Result<(), TrackerError> {
        self.expect_state(TrackerState::Building, PathOperation::Abort)?;
        self.path.clear();
        self.locked_color = None;
        self.state = TrackerState::Idle;
        log::debug!("path aborted");
        Ok(())
    }

    /// Resolves a gesture event against the board and drives the machine.
    pub fn handle(
        &mut self,
        input: PathInput,
        view: BoardView<'_>,
    ) -> Result<TrackerResponse, TrackerError> {
        match input {
            PathInput::Begin(cell) => {
                self.expect_state(TrackerState::Idle, PathOperation::Start)?;
                let Some(tile) = view.tile(cell) else {
                    return Ok(TrackerResponse::Ignored);
                };
                if self.start(tile)? {
                    Ok(TrackerResponse::Started(tile))
                } else {
                    Ok(TrackerResponse::Ignored)
                }
            }
            PathInput::Extend(cell) => {
                self.expect_state(TrackerState::Building, PathOperation::Extend)?;
                match view.tile(cell) {
                    Some(tile) => self.extend(tile).map(TrackerResponse::Extended),
                    None => Ok(TrackerResponse::Ignored),
                }
            }
            PathInput::End => self.commit().map(TrackerResponse::Committed),
            PathInput::Abort => self.abort().map(|()| TrackerResponse::Aborted),
        }
    }

    fn accepts(&self, tile: &Tile) -> bool {
        let Some(last) = self.path.last() else {
            return false;
        };
        if !last.cell().is_adjacent(tile.cell()) {
            return false;
        }
        if self.locked_color != Some(tile.color()) {
            return false;
        }
        if !self.joinable(tile) {
            return false;
        }
        !self.path.iter().any(|member| member.id() == tile.id())
    }

    fn joinable(&self, tile: &Tile) -> bool {
        match tile.special_kind() {
            SpecialKind::None => true,
            SpecialKind::ColorBomb => {
                self.config.color_bomb_trigger == ColorBombTrigger::PathConnection
            }
            SpecialKind::AreaBomb => false,
        }
    }

    fn expect_state(
        &self,
        expected: TrackerState,
        operation: PathOperation,
    ) -> Result<(), TrackerError> {
        if self.state == expected {
            return Ok(());
        }
        let error = TrackerError::InvalidTransition {
            state: self.state,
            operation,
        };
        log::warn!("{error}");
        Err(error)
    }
}
