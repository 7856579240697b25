#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for Dotlink.

mod board;
mod pool;

pub use board::Board;
pub use pool::TilePool;

use dotlink_core::{BoardError, CellCoord, Command, Event, GameConfig, Tile, TileId};

/// Represents the authoritative Dotlink board state.
///
/// The world starts with every slot empty; the cascade system populates it.
#[derive(Debug)]
pub struct World {
    board: Board,
    pool: TilePool,
}

impl World {
    /// Creates an empty world sized according to the configuration.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self::with_dimensions(config.columns, config.rows, config.initial_pool_slots)
    }

    /// Creates an empty world with explicit dimensions and pool size.
    #[must_use]
    pub fn with_dimensions(columns: u32, rows: u32, pool_slots: usize) -> Self {
        Self {
            board: Board::new(columns, rows),
            pool: TilePool::new(pool_slots),
        }
    }

    fn spawn(
        &mut self,
        cell: CellCoord,
        build: impl FnOnce(TileId) -> Tile,
    ) -> Result<Tile, BoardError> {
        let id = self.pool.acquire();
        let tile = build(id);
        match self.board.place(tile, cell) {
            Ok(()) => Ok(tile.at(cell)),
            Err(error) => {
                self.pool.release(id);
                Err(error)
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnTile { cell, color } => {
            match world.spawn(cell, |id| Tile::new(id, cell, color)) {
                Ok(tile) => out_events.push(Event::TileSpawned { tile }),
                Err(reason) => reject(cell, reason, out_events),
            }
        }
        Command::ClearTile { cell } => clear(world, cell, out_events),
        Command::MoveTile { from, to } => match world.board.move_tile(from, to) {
            Ok(tile) => {
                if from != to {
                    out_events.push(Event::TileFell { tile, from });
                }
            }
            Err(reason) => reject(from, reason, out_events),
        },
        Command::SpawnSpecial { cell, kind, color } => {
            if !kind.is_special() {
                log::warn!("ignoring special spawn of kind {kind:?} at {cell}");
                return;
            }
            if let Some(existing) = world.board.get(cell).copied() {
                if existing.is_special() {
                    reject(cell, BoardError::OccupiedSlot { cell }, out_events);
                    return;
                }
                clear(world, cell, out_events);
            }
            match world.spawn(cell, |id| Tile::special(id, cell, kind, color)) {
                Ok(tile) => out_events.push(Event::SpecialSpawned { tile }),
                Err(reason) => reject(cell, reason, out_events),
            }
        }
        Command::DetonateSpecial { cell } => match world.board.detonate(cell) {
            Some(tile) => {
                world.pool.release(tile.id());
                out_events.push(Event::SpecialDetonated { tile });
            }
            None => log::warn!("no special tile to detonate at {cell}"),
        },
        Command::CycleColor { cell, palette_len } => {
            let Some(current) = world.board.get(cell).map(Tile::color) else {
                return;
            };
            if let Some((tile, previous)) = world.board.recolor(cell, current.cycled(palette_len)) {
                out_events.push(Event::TileRecolored { tile, previous });
            }
        }
    }
}

fn clear(world: &mut World, cell: CellCoord, out_events: &mut Vec<Event>) {
    let Some(existing) = world.board.get(cell).copied() else {
        return;
    };
    if existing.is_special() {
        log::debug!("clear skipped {:?} at {cell}", existing.special_kind());
        out_events.push(Event::ClearSkipped { tile: existing });
        return;
    }
    if let Some(tile) = world.board.clear(cell) {
        world.pool.release(tile.id());
        out_events.push(Event::TileCleared { tile });
    }
}

fn reject(cell: CellCoord, reason: BoardError, out_events: &mut Vec<Event>) {
    log::error!("board refused mutation at {cell}: {reason}");
    debug_assert!(
        !matches!(reason, BoardError::OccupiedSlot { .. }),
        "occupied slot at {cell}: {reason}"
    );
    out_events.push(Event::PlacementRejected { cell, reason });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Board, TilePool, World};
    use dotlink_core::{BoardView, CellCoord, Tile};

    /// Provides read-only access to the board.
    #[must_use]
    pub fn board(world: &World) -> &Board {
        &world.board
    }

    /// Captures a read-only view of the board matrix.
    #[must_use]
    pub fn board_view(world: &World) -> BoardView<'_> {
        world.board.view()
    }

    /// Tile occupying the provided cell, if any.
    #[must_use]
    pub fn tile_at(world: &World, cell: CellCoord) -> Option<Tile> {
        world.board.get(cell).copied()
    }

    /// Board dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.board.width(), world.board.height())
    }

    /// Provides read-only access to the tile slot pool.
    #[must_use]
    pub fn pool(world: &World) -> &TilePool {
        &world.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotlink_core::{SpecialKind, TileColor};

    fn apply_all(world: &mut World, commands: &[Command]) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            apply(world, *command, &mut events);
        }
        events
    }

    #[test]
    fn spawn_tile_draws_from_pool() {
        let mut world = World::with_dimensions(2, 2, 4);
        let cell = CellCoord::new(1, 0);
        let events = apply_all(
            &mut world,
            &[Command::SpawnTile {
                cell,
                color: TileColor::new(2),
            }],
        );

        let tile = query::tile_at(&world, cell).expect("tile spawned");
        assert_eq!(events, vec![Event::TileSpawned { tile }]);
        assert_eq!(tile.color(), TileColor::new(2));
        assert_eq!(query::pool(&world).in_use(), 1);
        assert_eq!(query::pool(&world).available(), 3);
    }

    #[test]
    fn clear_returns_slot_to_pool() {
        let mut world = World::with_dimensions(1, 1, 1);
        let cell = CellCoord::new(0, 0);
        let _ = apply_all(
            &mut world,
            &[Command::SpawnTile {
                cell,
                color: TileColor::new(0),
            }],
        );
        let events = apply_all(&mut world, &[Command::ClearTile { cell }]);

        assert!(matches!(events.as_slice(), [Event::TileCleared { .. }]));
        assert!(query::tile_at(&world, cell).is_none());
        assert_eq!(query::pool(&world).available(), 1);
    }

    #[test]
    fn clear_skips_special_tile_and_reports_it() {
        let mut world = World::with_dimensions(1, 1, 2);
        let cell = CellCoord::new(0, 0);
        let _ = apply_all(
            &mut world,
            &[
                Command::SpawnTile {
                    cell,
                    color: TileColor::new(1),
                },
                Command::SpawnSpecial {
                    cell,
                    kind: SpecialKind::AreaBomb,
                    color: TileColor::new(1),
                },
            ],
        );

        let events = apply_all(&mut world, &[Command::ClearTile { cell }]);
        let bomb = query::tile_at(&world, cell).expect("bomb survives");
        assert_eq!(bomb.special_kind(), SpecialKind::AreaBomb);
        assert_eq!(events, vec![Event::ClearSkipped { tile: bomb }]);
    }

    #[test]
    fn spawn_special_replaces_ordinary_tile() {
        let mut world = World::with_dimensions(1, 1, 2);
        let cell = CellCoord::new(0, 0);
        let events = apply_all(
            &mut world,
            &[
                Command::SpawnTile {
                    cell,
                    color: TileColor::new(3),
                },
                Command::SpawnSpecial {
                    cell,
                    kind: SpecialKind::ColorBomb,
                    color: TileColor::new(3),
                },
            ],
        );

        assert!(matches!(
            events.as_slice(),
            [
                Event::TileSpawned { .. },
                Event::TileCleared { .. },
                Event::SpecialSpawned { .. }
            ]
        ));
        let bomb = query::tile_at(&world, cell).expect("color bomb placed");
        assert_eq!(bomb.special_kind(), SpecialKind::ColorBomb);
        assert_eq!(bomb.color(), TileColor::new(3));
        assert_eq!(query::pool(&world).in_use(), 1);
    }

    #[test]
    fn detonate_removes_special_tile() {
        let mut world = World::with_dimensions(1, 1, 1);
        let cell = CellCoord::new(0, 0);
        let _ = apply_all(
            &mut world,
            &[Command::SpawnSpecial {
                cell,
                kind: SpecialKind::AreaBomb,
                color: TileColor::new(0),
            }],
        );
        let events = apply_all(&mut world, &[Command::DetonateSpecial { cell }]);

        assert!(matches!(events.as_slice(), [Event::SpecialDetonated { .. }]));
        assert!(query::tile_at(&world, cell).is_none());
        assert_eq!(query::pool(&world).in_use(), 0);
    }

    #[test]
    fn move_out_of_bounds_is_rejected() {
        let mut world = World::with_dimensions(1, 2, 2);
        let from = CellCoord::new(0, 0);
        let _ = apply_all(
            &mut world,
            &[Command::SpawnTile {
                cell: from,
                color: TileColor::new(0),
            }],
        );
        let to = CellCoord::new(0, 5);
        let events = apply_all(&mut world, &[Command::MoveTile { from, to }]);

        assert_eq!(
            events,
            vec![Event::PlacementRejected {
                cell: from,
                reason: BoardError::OutOfBounds { cell: to },
            }]
        );
        assert!(query::tile_at(&world, from).is_some(), "rejected move leaves the tile");
    }

    #[test]
    fn cycle_color_wraps_palette() {
        let mut world = World::with_dimensions(1, 1, 1);
        let cell = CellCoord::new(0, 0);
        let _ = apply_all(
            &mut world,
            &[Command::SpawnTile {
                cell,
                color: TileColor::new(4),
            }],
        );
        let events = apply_all(
            &mut world,
            &[Command::CycleColor {
                cell,
                palette_len: 5,
            }],
        );

        let tile = query::tile_at(&world, cell).expect("tile present");
        assert_eq!(tile.color(), TileColor::new(0));
        assert_eq!(
            events,
            vec![Event::TileRecolored {
                tile,
                previous: TileColor::new(4),
            }]
        );
    }
}
