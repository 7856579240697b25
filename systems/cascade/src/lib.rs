#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Gravity compaction, refill and shuffle of the Dotlink board.

mod colors;

pub use colors::{ColorSequence, ColorSource, SeededColors};

use dotlink_core::{
    BoardView, BusyGuards, BusyOperation, CellCoord, Command, Event, RejectedOperation, Tile,
};
use dotlink_world::{self as world, query, World};

/// Totals produced by a single cascade run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Tiles that dropped to a lower row.
    pub fallen: u32,
    /// Tiles spawned into empty slots.
    pub spawned: u32,
}

/// Settles the board after tiles were removed.
///
/// Every mutating entry point holds a busy guard for its whole duration, so
/// overlapping requests are rejected instead of queued.
#[derive(Debug)]
pub struct CascadeEngine {
    guards: BusyGuards,
    palette_len: u8,
    source: Box<dyn ColorSource>,
    scratch: Vec<Command>,
}

impl CascadeEngine {
    /// Creates an engine drawing new tile colors from `source`.
    #[must_use]
    pub fn new(guards: BusyGuards, palette_len: u8, source: Box<dyn ColorSource>) -> Self {
        Self {
            guards,
            palette_len,
            source,
            scratch: Vec::new(),
        }
    }

    /// Shared guard handle the engine acquires while it runs.
    #[must_use]
    pub fn guards(&self) -> &BusyGuards {
        &self.guards
    }

    /// Reports whether a refill is in progress.
    #[must_use]
    pub fn is_refilling(&self) -> bool {
        self.guards.is_refilling()
    }

    /// Reports whether a shuffle is in progress.
    #[must_use]
    pub fn is_shuffling(&self) -> bool {
        self.guards.is_shuffling()
    }

    /// Drops every tile to the lowest free row of its column, then fills the
    /// gaps left at the top.
    ///
    /// Columns compact in ascending order first; spawning follows, column by
    /// column and row by row from the top. The board is final once
    /// [`Event::CascadeCompleted`] is pushed.
    pub fn resolve(
        &mut self,
        world: &mut World,
        out_events: &mut Vec<Event>,
    ) -> Result<CascadeReport, RejectedOperation> {
        let _token = self.guards.try_acquire(BusyOperation::Refilling)?;

        let mut commands = std::mem::take(&mut self.scratch);
        commands.clear();
        plan_gravity(query::board_view(world), &mut commands);
        let fallen = apply_counted(world, &mut commands, out_events);

        self.plan_refill(query::board_view(world), &mut commands);
        let spawned = apply_counted(world, &mut commands, out_events);
        self.scratch = commands;

        let report = CascadeReport { fallen, spawned };
        log::debug!(
            "cascade settled: {} fallen, {} spawned",
            report.fallen,
            report.spawned
        );
        out_events.push(Event::CascadeCompleted {
            fallen: report.fallen,
            spawned: report.spawned,
        });
        Ok(report)
    }

    /// Replaces every ordinary tile with a fresh draw. Special tiles stay put
    /// and then settle like any other tile.
    pub fn shuffle(
        &mut self,
        world: &mut World,
        out_events: &mut Vec<Event>,
    ) -> Result<CascadeReport, RejectedOperation> {
        {
            let _token = self.guards.try_acquire(BusyOperation::Shuffling)?;
            let cells: Vec<CellCoord> = query::board_view(world)
                .tiles()
                .filter(|tile| !tile.is_special())
                .map(|tile| tile.cell())
                .collect();
            log::debug!("shuffle clearing {} tiles", cells.len());
            for cell in cells {
                world::apply(world, Command::ClearTile { cell }, out_events);
            }
        }
        self.resolve(world, out_events)
    }

    fn plan_refill(&mut self, view: BoardView<'_>, out: &mut Vec<Command>) {
        for column in 0..view.columns() {
            for row in 0..view.rows() {
                let cell = CellCoord::new(column, row);
                if view.is_empty(cell) {
                    out.push(Command::SpawnTile {
                        cell,
                        color: self.source.next_color(self.palette_len),
                    });
                }
            }
        }
    }
}

/// Emits the moves that compact every column toward the bottom row.
///
/// Moves are ordered bottom-up within a column so each target slot is already
/// free when its move applies.
fn plan_gravity(view: BoardView<'_>, out: &mut Vec<Command>) {
    for column in 0..view.columns() {
        let mut floor = view.rows();
        for row in (0..view.rows()).rev() {
            let from = CellCoord::new(column, row);
            let Some(tile) = view.tile(from) else {
                continue;
            };
            floor -= 1;
            if floor != row {
                out.push(Command::MoveTile {
                    from: tile.cell(),
                    to: CellCoord::new(column, floor),
                });
            }
        }
    }
}

fn apply_counted(world: &mut World, commands: &mut Vec<Command>, out_events: &mut Vec<Event>) -> u32 {
    let start = out_events.len();
    for command in commands.drain(..) {
        world::apply(world, command, out_events);
    }
    let settled = out_events[start..]
        .iter()
        .filter(|event| matches!(event, Event::TileFell { .. } | Event::TileSpawned { .. }))
        .count();
    u32::try_from(settled).unwrap_or(u32::MAX)
}

/// Reports whether any column holds an empty slot beneath an occupied one.
#[must_use]
pub fn has_floating_tiles(view: BoardView<'_>) -> bool {
    (0..view.columns()).any(|column| {
        let mut seen_tile = false;
        (0..view.rows()).any(|row| {
            let occupied = view.tile(CellCoord::new(column, row)).is_some();
            let floating = seen_tile && !occupied;
            seen_tile |= occupied;
            floating
        })
    })
}

/// Tiles of `column` ordered from the top row down.
#[must_use]
pub fn column_tiles(view: BoardView<'_>, column: u32) -> Vec<Tile> {
    (0..view.rows())
        .filter_map(|row| view.tile(CellCoord::new(column, row)))
        .collect()
}
