#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Activation of area bombs and color bombs.

use dotlink_core::{
    BoardView, CellCoord, ColorBombTrigger, Command, Event, RejectedOperation, SpecialKind, Tile,
};
use dotlink_system_cascade::{CascadeEngine, CascadeReport};
use dotlink_system_connectivity::cells_of_color;
use dotlink_world::{self as world, query, World};
use thiserror::Error;

/// Reasons an activation request is refused.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ActivationError {
    /// The cell is empty or holds an ordinary tile.
    #[error("no special tile at {cell}")]
    NotSpecial {
        /// Cell the request addressed.
        cell: CellCoord,
    },
    /// The special tile does not react to direct interaction.
    #[error("{kind:?} at {cell} only detonates when a path connects to it")]
    NotTriggerable {
        /// Cell holding the special tile.
        cell: CellCoord,
        /// Kind of the special tile.
        kind: SpecialKind,
    },
    /// Another board operation is in progress.
    #[error(transparent)]
    Rejected(#[from] RejectedOperation),
}

/// Cells a single detonation removes, in application order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blast {
    bomb: Tile,
    clears: Vec<CellCoord>,
}

impl Blast {
    /// Computes the blast of `bomb` on the current board.
    ///
    /// Ordinary tiles are the only casualties; other special tiles inside
    /// the blast survive. Returns `None` when `bomb` is not special.
    #[must_use]
    pub fn of(view: BoardView<'_>, bomb: Tile) -> Option<Self> {
        let clears = match bomb.special_kind() {
            SpecialKind::None => return None,
            SpecialKind::AreaBomb => area_cells(view, bomb.cell()),
            SpecialKind::ColorBomb => cells_of_color(view, bomb.color()),
        };
        Some(Self { bomb, clears })
    }

    /// Special tile that detonates.
    #[must_use]
    pub const fn bomb(&self) -> Tile {
        self.bomb
    }

    /// Ordinary cells cleared before the bomb itself detonates.
    #[must_use]
    pub fn clears(&self) -> &[CellCoord] {
        &self.clears
    }

    /// Applies the blast: clears in order, then detonates the bomb last.
    ///
    /// Does not settle the board; callers run the cascade once afterwards.
    pub fn apply(&self, world: &mut World, out_events: &mut Vec<Event>) {
        log::debug!(
            "{:?} at {} clearing {} tiles",
            self.bomb.special_kind(),
            self.bomb.cell(),
            self.clears.len()
        );
        for &cell in &self.clears {
            world::apply(world, Command::ClearTile { cell }, out_events);
        }
        world::apply(
            world,
            Command::DetonateSpecial {
                cell: self.bomb.cell(),
            },
            out_events,
        );
    }
}

/// Outcome of a successful activation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActivationReport {
    /// Ordinary tiles removed by the blast.
    pub cleared: u32,
    /// Totals of the cascade that followed.
    pub cascade: CascadeReport,
}

/// Controller for direct interaction with special tiles.
#[derive(Clone, Copy, Debug)]
pub struct SpecialTiles {
    trigger: ColorBombTrigger,
}

impl SpecialTiles {
    /// Creates a controller honouring the configured color bomb trigger.
    #[must_use]
    pub const fn new(trigger: ColorBombTrigger) -> Self {
        Self { trigger }
    }

    /// Trigger mode for color bombs.
    #[must_use]
    pub const fn trigger(&self) -> ColorBombTrigger {
        self.trigger
    }

    /// Computes what activating `cell` would do without touching the board.
    pub fn plan_activation(
        &self,
        view: BoardView<'_>,
        cell: CellCoord,
    ) -> Result<Blast, ActivationError> {
        let tile = view
            .tile(cell)
            .filter(Tile::is_special)
            .ok_or(ActivationError::NotSpecial { cell })?;
        if tile.special_kind() == SpecialKind::ColorBomb
            && self.trigger == ColorBombTrigger::PathConnection
        {
            return Err(ActivationError::NotTriggerable {
                cell,
                kind: tile.special_kind(),
            });
        }
        Blast::of(view, tile).ok_or(ActivationError::NotSpecial { cell })
    }

    /// Detonates the special tile at `cell` and settles the board once.
    pub fn activate(
        &self,
        cell: CellCoord,
        world: &mut World,
        cascade: &mut CascadeEngine,
        out_events: &mut Vec<Event>,
    ) -> Result<ActivationReport, ActivationError> {
        cascade.guards().ensure_idle()?;
        let blast = match self.plan_activation(query::board_view(world), cell) {
            Ok(blast) => blast,
            Err(error) => {
                log::debug!("activation refused: {error}");
                return Err(error);
            }
        };

        let start = out_events.len();
        blast.apply(world, out_events);
        let cleared = out_events[start..]
            .iter()
            .filter(|event| matches!(event, Event::TileCleared { .. }))
            .count();
        let cascade = cascade.resolve(world, out_events)?;

        Ok(ActivationReport {
            cleared: u32::try_from(cleared).unwrap_or(u32::MAX),
            cascade,
        })
    }
}

fn area_cells(view: BoardView<'_>, center: CellCoord) -> Vec<CellCoord> {
    let column = i64::from(center.column());
    let row = i64::from(center.row());
    let mut cells = Vec::with_capacity(8);
    for y in row - 1..=row + 1 {
        for x in column - 1..=column + 1 {
            if let Some(tile) = view.tile_signed(x, y) {
                if !tile.is_special() {
                    cells.push(tile.cell());
                }
            }
        }
    }
    cells
}
