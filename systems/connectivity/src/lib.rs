#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Connectivity scans over the board: same-color clusters, hints, and color sweeps.

use std::collections::VecDeque;

use dotlink_core::{BoardView, CellCoord, Tile, TileColor};

/// Maximal set of same-colored, orthogonally connected ordinary tiles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cluster {
    tiles: Vec<Tile>,
}

impl Cluster {
    /// Tiles in breadth-first discovery order, starting with the seed tile.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Cells covered by the cluster in discovery order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.tiles.iter().map(Tile::cell)
    }

    /// Number of tiles in the cluster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the cluster holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Shared color of the cluster, if it holds any tile.
    #[must_use]
    pub fn color(&self) -> Option<TileColor> {
        self.tiles.first().map(Tile::color)
    }

    /// Reports whether the cluster covers `cell`.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.tiles.iter().any(|tile| tile.cell() == cell)
    }

    /// Consumes the cluster, yielding its tiles.
    #[must_use]
    pub fn into_vec(self) -> Vec<Tile> {
        self.tiles
    }
}

/// Flood-fill scanner that reuses its scratch buffers between scans.
#[derive(Debug, Default)]
pub struct ConnectivityScanner {
    scratch_visited: Vec<bool>,
    scratch_frontier: VecDeque<CellCoord>,
}

impl ConnectivityScanner {
    /// Creates a scanner with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the cluster reachable from `start`.
    ///
    /// An empty start cell yields an empty cluster. Special tiles never join a
    /// cluster, so a special start cell yields a cluster holding only itself.
    pub fn find_cluster(&mut self, view: BoardView<'_>, start: CellCoord) -> Cluster {
        let Some(seed) = view.tile(start) else {
            return Cluster::default();
        };
        if seed.is_special() {
            return Cluster { tiles: vec![seed] };
        }

        self.reset(view);
        let mut tiles = Vec::new();
        self.flood(view, seed, &mut tiles);
        Cluster { tiles }
    }

    /// Finds the first cluster, in row-major scan order, holding at least `min_len` tiles.
    ///
    /// Every cell is visited at most once across the whole scan, so the result
    /// is deterministic for a given board.
    pub fn find_hint(&mut self, view: BoardView<'_>, min_len: usize) -> Option<Cluster> {
        self.reset(view);
        let mut tiles = Vec::new();

        for (cell, tile) in view.cells() {
            let Some(tile) = tile else {
                continue;
            };
            if tile.is_special() || self.is_visited(view, cell) {
                continue;
            }

            tiles.clear();
            self.flood(view, tile, &mut tiles);
            if tiles.len() >= min_len {
                return Some(Cluster { tiles });
            }
        }

        None
    }

    /// Reports whether any committable cluster exists on the board.
    pub fn has_any_match(&mut self, view: BoardView<'_>, min_len: usize) -> bool {
        self.find_hint(view, min_len).is_some()
    }

    fn reset(&mut self, view: BoardView<'_>) {
        let capacity = usize::try_from(u64::from(view.columns()) * u64::from(view.rows()))
            .unwrap_or(0);
        self.scratch_visited.clear();
        self.scratch_visited.resize(capacity, false);
        self.scratch_frontier.clear();
    }

    fn flood(&mut self, view: BoardView<'_>, seed: Tile, out: &mut Vec<Tile>) {
        let color = seed.color();
        self.mark_visited(view, seed.cell());
        self.scratch_frontier.push_back(seed.cell());

        while let Some(cell) = self.scratch_frontier.pop_front() {
            let Some(tile) = view.tile(cell) else {
                continue;
            };
            out.push(tile);

            for neighbour in cell.neighbours() {
                if self.is_visited(view, neighbour) {
                    continue;
                }
                let joins = view
                    .tile(neighbour)
                    .is_some_and(|candidate| !candidate.is_special() && candidate.color() == color);
                if joins {
                    self.mark_visited(view, neighbour);
                    self.scratch_frontier.push_back(neighbour);
                }
            }
        }
    }

    fn is_visited(&self, view: BoardView<'_>, cell: CellCoord) -> bool {
        index(view, cell)
            .and_then(|index| self.scratch_visited.get(index).copied())
            .unwrap_or(true)
    }

    fn mark_visited(&mut self, view: BoardView<'_>, cell: CellCoord) {
        if let Some(slot) = index(view, cell).and_then(|index| self.scratch_visited.get_mut(index)) {
            *slot = true;
        }
    }
}

/// Every occupied, non-special cell of `color`, in row-major order.
///
/// This is a whole-board predicate, not a flood fill: matching cells need not
/// be connected.
#[must_use]
pub fn cells_of_color(view: BoardView<'_>, color: TileColor) -> Vec<CellCoord> {
    view.tiles()
        .filter(|tile| !tile.is_special() && tile.color() == color)
        .map(|tile| tile.cell())
        .collect()
}

fn index(view: BoardView<'_>, cell: CellCoord) -> Option<usize> {
    if !view.contains(cell) {
        return None;
    }
    let row = usize::try_from(cell.row()).ok()?;
    let column = usize::try_from(cell.column()).ok()?;
    let width = usize::try_from(view.columns()).ok()?;
    Some(row * width + column)
}
