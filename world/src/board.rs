//! Dense tile matrix owned by the world.

use dotlink_core::{BoardError, BoardView, CellCoord, Slot, Tile, TileColor};

/// Rectangular matrix of slots, stored row-major with row zero at the top.
#[derive(Clone, Debug)]
pub struct Board {
    columns: u32,
    rows: u32,
    slots: Vec<Slot>,
}

impl Board {
    /// Creates a board of empty slots.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            slots: vec![Slot::Empty; capacity],
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.columns
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.rows
    }

    /// Read-only view used by the board systems.
    #[must_use]
    pub fn view(&self) -> BoardView<'_> {
        BoardView::new(&self.slots, self.columns, self.rows)
    }

    /// Tile at `cell`. Cells beyond the board hold no tile.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<&Tile> {
        self.index(cell)
            .and_then(|index| self.slots.get(index))
            .and_then(Slot::tile)
    }

    /// Signed variant of [`Board::get`] for probes that step past an edge.
    #[must_use]
    pub fn get_signed(&self, column: i64, row: i64) -> Option<&Tile> {
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        self.get(CellCoord::new(column, row))
    }

    /// Stores `tile` in the empty slot at `cell`, rewriting the tile's position.
    pub fn place(&mut self, tile: Tile, cell: CellCoord) -> Result<(), BoardError> {
        let slot = self.slot_mut(cell)?;
        if !slot.is_empty() {
            return Err(BoardError::OccupiedSlot { cell });
        }
        *slot = Slot::Occupied(tile.at(cell));
        Ok(())
    }

    /// Empties the slot at `cell` and returns the destroyed tile.
    ///
    /// Special tiles are exempt: clearing their slot leaves them in place and
    /// returns `None`. Only [`Board::detonate`] removes them.
    pub fn clear(&mut self, cell: CellCoord) -> Option<Tile> {
        let slot = self.slot_mut(cell).ok()?;
        match *slot {
            Slot::Occupied(tile) if !tile.is_special() => {
                *slot = Slot::Empty;
                Some(tile)
            }
            _ => None,
        }
    }

    /// Removes the special tile at `cell`. Ordinary tiles are left alone.
    pub fn detonate(&mut self, cell: CellCoord) -> Option<Tile> {
        let slot = self.slot_mut(cell).ok()?;
        match *slot {
            Slot::Occupied(tile) if tile.is_special() => {
                *slot = Slot::Empty;
                Some(tile)
            }
            _ => None,
        }
    }

    /// Moves the tile at `from` into the empty slot at `to` and returns it.
    pub fn move_tile(&mut self, from: CellCoord, to: CellCoord) -> Result<Tile, BoardError> {
        let tile = match self.get(from) {
            Some(tile) => *tile,
            None if self.index(from).is_none() => {
                return Err(BoardError::OutOfBounds { cell: from });
            }
            None => return Err(BoardError::EmptySlot { cell: from }),
        };
        if from == to {
            return Ok(tile);
        }

        self.place(tile, to)?;
        *self.slot_mut(from)? = Slot::Empty;
        Ok(tile.at(to))
    }

    /// Recolors the ordinary tile at `cell`, returning the updated tile and its previous color.
    pub fn recolor(&mut self, cell: CellCoord, color: TileColor) -> Option<(Tile, TileColor)> {
        let slot = self.slot_mut(cell).ok()?;
        match *slot {
            Slot::Occupied(tile) if !tile.is_special() => {
                let updated = tile.with_color(color);
                *slot = Slot::Occupied(updated);
                Some((updated, tile.color()))
            }
            _ => None,
        }
    }

    fn slot_mut(&mut self, cell: CellCoord) -> Result<&mut Slot, BoardError> {
        self.index(cell)
            .and_then(|index| self.slots.get_mut(index))
            .ok_or(BoardError::OutOfBounds { cell })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotlink_core::{SpecialKind, TileId};

    fn red(id: u32) -> Tile {
        Tile::new(TileId::new(id), CellCoord::new(0, 0), TileColor::new(0))
    }

    fn bomb(id: u32) -> Tile {
        Tile::special(
            TileId::new(id),
            CellCoord::new(0, 0),
            SpecialKind::AreaBomb,
            TileColor::new(0),
        )
    }

    #[test]
    fn place_rewrites_tile_position() {
        let mut board = Board::new(3, 3);
        let cell = CellCoord::new(2, 1);
        board.place(red(1), cell).expect("empty slot accepts a tile");

        let stored = board.get(cell).expect("tile stored");
        assert_eq!(stored.cell(), cell);
        assert_eq!(stored.id(), TileId::new(1));
    }

    #[test]
    fn place_into_occupied_slot_fails() {
        let mut board = Board::new(2, 2);
        let cell = CellCoord::new(1, 1);
        board.place(red(1), cell).expect("empty slot accepts a tile");

        assert_eq!(
            board.place(red(2), cell),
            Err(BoardError::OccupiedSlot { cell })
        );
        assert_eq!(board.get(cell).map(Tile::id), Some(TileId::new(1)));
    }

    #[test]
    fn out_of_range_reads_are_empty() {
        let board = Board::new(2, 2);
        assert!(board.get(CellCoord::new(2, 0)).is_none());
        assert!(board.get(CellCoord::new(0, 9)).is_none());
        assert!(board.get_signed(-1, 0).is_none());
        assert!(board.get_signed(0, -1).is_none());
    }

    #[test]
    fn clear_exempts_special_tiles() {
        let mut board = Board::new(2, 1);
        let ordinary = CellCoord::new(0, 0);
        let special = CellCoord::new(1, 0);
        board.place(red(1), ordinary).expect("place ordinary");
        board.place(bomb(2), special).expect("place bomb");

        assert_eq!(board.clear(ordinary).map(|tile| tile.id()), Some(TileId::new(1)));
        assert!(board.get(ordinary).is_none());

        assert!(board.clear(special).is_none(), "bombs survive generic clears");
        assert!(board.get(special).is_some());
    }

    #[test]
    fn detonate_only_removes_special_tiles() {
        let mut board = Board::new(2, 1);
        board.place(red(1), CellCoord::new(0, 0)).expect("place ordinary");
        board.place(bomb(2), CellCoord::new(1, 0)).expect("place bomb");

        assert!(board.detonate(CellCoord::new(0, 0)).is_none());
        assert!(board.get(CellCoord::new(0, 0)).is_some());
        assert_eq!(
            board.detonate(CellCoord::new(1, 0)).map(|tile| tile.id()),
            Some(TileId::new(2))
        );
        assert!(board.get(CellCoord::new(1, 0)).is_none());
    }

    #[test]
    fn move_tile_relocates_into_empty_slot() {
        let mut board = Board::new(1, 3);
        board.place(red(4), CellCoord::new(0, 0)).expect("place");

        let moved = board
            .move_tile(CellCoord::new(0, 0), CellCoord::new(0, 2))
            .expect("move into empty slot");
        assert_eq!(moved.cell(), CellCoord::new(0, 2));
        assert!(board.get(CellCoord::new(0, 0)).is_none());
        assert_eq!(board.get(CellCoord::new(0, 2)).map(Tile::cell), Some(CellCoord::new(0, 2)));
    }

    #[test]
    fn move_tile_reports_missing_source() {
        let mut board = Board::new(1, 2);
        assert_eq!(
            board.move_tile(CellCoord::new(0, 0), CellCoord::new(0, 1)),
            Err(BoardError::EmptySlot {
                cell: CellCoord::new(0, 0)
            })
        );
        assert_eq!(
            board.move_tile(CellCoord::new(3, 0), CellCoord::new(0, 1)),
            Err(BoardError::OutOfBounds {
                cell: CellCoord::new(3, 0)
            })
        );
    }

    #[test]
    fn recolor_skips_special_tiles() {
        let mut board = Board::new(2, 1);
        board.place(red(1), CellCoord::new(0, 0)).expect("place ordinary");
        board.place(bomb(2), CellCoord::new(1, 0)).expect("place bomb");

        let (updated, previous) = board
            .recolor(CellCoord::new(0, 0), TileColor::new(3))
            .expect("ordinary tile recolors");
        assert_eq!(updated.color(), TileColor::new(3));
        assert_eq!(previous, TileColor::new(0));
        assert!(board.recolor(CellCoord::new(1, 0), TileColor::new(3)).is_none());
    }
}
