//! The logical clock.
//!
//! The enclosing environment owns time. The ledger only reads the current
//! block height when it stamps a new record.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::BlockHeight;

/// Source of the current logical time.
pub trait Clock: Send + Sync {
    /// The current block height.
    fn now(&self) -> BlockHeight;
}

/// A clock pinned to one height.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub BlockHeight);

impl Clock for FixedClock {
    fn now(&self) -> BlockHeight {
        self.0
    }
}

/// A clock driven by the caller, one block at a time.
///
/// Heights only move forward: [`ManualClock::set`] ignores a lower value.
#[derive(Debug, Default)]
pub struct ManualClock {
    height: AtomicU64,
}

impl ManualClock {
    pub fn new(start: BlockHeight) -> Self {
        Self {
            height: AtomicU64::new(start.0),
        }
    }

    /// Advance by `blocks` and return the new height. Saturates at `u64::MAX`.
    pub fn advance(&self, blocks: u64) -> BlockHeight {
        let prev = self
            .height
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |h| {
                Some(h.saturating_add(blocks))
            })
            .unwrap_or_else(|h| h);
        BlockHeight(prev.saturating_add(blocks))
    }

    /// Jump forward to `height`.
    pub fn set(&self, height: BlockHeight) {
        self.height.fetch_max(height.0, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> BlockHeight {
        BlockHeight(self.height.load(Ordering::SeqCst))
    }
}
