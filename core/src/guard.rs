//! Busy guards serialising long-running board operations.

use std::{cell::Cell, fmt, rc::Rc};

use crate::RejectedOperation;

/// Long-running board operations that must never overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BusyOperation {
    /// Gravity compaction and refill of the board.
    Refilling,
    /// Whole-board reset followed by a refill.
    Shuffling,
}

impl fmt::Display for BusyOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refilling => f.write_str("refilling"),
            Self::Shuffling => f.write_str("shuffling"),
        }
    }
}

/// Shared acquire-or-reject flag set guarding board operations.
///
/// Cloning yields another handle to the same flag. At most one operation is
/// held at any time; the holder keeps a [`GuardToken`] and the flag clears
/// when that token drops.
#[derive(Clone, Debug, Default)]
pub struct BusyGuards {
    held: Rc<Cell<Option<BusyOperation>>>,
}

impl BusyGuards {
    /// Creates a new, idle guard set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Operation currently holding the guard, if any.
    #[must_use]
    pub fn held(&self) -> Option<BusyOperation> {
        self.held.get()
    }

    /// Reports whether any operation holds the guard.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.held().is_some()
    }

    /// Reports whether a refill is in progress.
    #[must_use]
    pub fn is_refilling(&self) -> bool {
        self.held() == Some(BusyOperation::Refilling)
    }

    /// Reports whether a shuffle is in progress.
    #[must_use]
    pub fn is_shuffling(&self) -> bool {
        self.held() == Some(BusyOperation::Shuffling)
    }

    /// Fails with [`RejectedOperation`] when the guard is already held.
    pub fn ensure_idle(&self) -> Result<(), RejectedOperation> {
        match self.held() {
            Some(held) => Err(RejectedOperation::new(held)),
            None => Ok(()),
        }
    }

    /// Claims the guard for `operation`, or rejects if anything already holds it.
    pub fn try_acquire(&self, operation: BusyOperation) -> Result<GuardToken, RejectedOperation> {
        if let Err(rejection) = self.ensure_idle() {
            log::warn!("rejected {operation}: {rejection}");
            return Err(rejection);
        }

        self.held.set(Some(operation));
        log::debug!("{operation} started");
        Ok(GuardToken {
            guards: self.clone(),
            operation,
        })
    }
}

/// Proof of holding the busy guard. Releases the guard when dropped.
#[derive(Debug)]
#[must_use = "the guard is released as soon as the token is dropped"]
pub struct GuardToken {
    guards: BusyGuards,
    operation: BusyOperation,
}

impl GuardToken {
    /// Operation the token was acquired for.
    #[must_use]
    pub const fn operation(&self) -> BusyOperation {
        self.operation
    }
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        debug_assert_eq!(self.guards.held(), Some(self.operation));
        self.guards.held.set(None);
        log::debug!("{} finished", self.operation);
    }
}
