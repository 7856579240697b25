//! Free-list of reusable tile identifiers.

use std::collections::VecDeque;

use dotlink_core::TileId;

/// Recycles tile identifiers so presentation layers can reuse visual instances.
///
/// Identifiers are handed out first-in, first-out. When the free list runs dry
/// the pool grows by minting a fresh identifier.
#[derive(Debug)]
pub struct TilePool {
    free: VecDeque<TileId>,
    next_id: u32,
    in_use: usize,
}

impl TilePool {
    /// Creates a pool with `initial_slots` identifiers ready for use.
    #[must_use]
    pub fn new(initial_slots: usize) -> Self {
        let initial = u32::try_from(initial_slots).unwrap_or(u32::MAX);
        Self {
            free: (0..initial).map(TileId::new).collect(),
            next_id: initial,
            in_use: 0,
        }
    }

    /// Takes an identifier from the free list, growing the pool when empty.
    pub fn acquire(&mut self) -> TileId {
        let id = match self.free.pop_front() {
            Some(id) => id,
            None => {
                let id = TileId::new(self.next_id);
                self.next_id = self.next_id.saturating_add(1);
                log::debug!("tile pool exhausted, grew to {} slots", self.next_id);
                id
            }
        };
        self.in_use += 1;
        id
    }

    /// Returns an identifier to the free list.
    pub fn release(&mut self, id: TileId) {
        debug_assert!(!self.free.contains(&id), "tile {id:?} released twice");
        self.in_use = self.in_use.saturating_sub(1);
        self.free.push_back(id);
    }

    /// Number of identifiers waiting on the free list.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Number of identifiers currently held by tiles on the board.
    #[must_use]
    pub const fn in_use(&self) -> usize {
        self.in_use
    }

    /// Total number of identifiers the pool has ever minted.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.next_id
    }
}
