//! Proven-prefix watermark.
//!
//! # Purpose
//!
//! Once a prefix of the merged timeline has been proven stable it must never
//! be retracted: the consumer has already rendered those rows. This module
//! tracks the proven length and refuses to move it backwards.
//!
//! # Invariants
//!
//! - **Non-decreasing**: `advance` with a smaller value is a no-op.
//! - **Advances only on proof**: callers advance after a merge decision, never
//!   speculatively.
//! - **Pure**: no IO; the caller decides what to do with the result.

/// Length of the merged-timeline prefix proven stable against further fetches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StablePrefix {
    proven: usize,
}

impl StablePrefix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current proven length. Zero until a first proof lands.
    pub fn len(&self) -> usize {
        self.proven
    }

    pub fn is_empty(&self) -> bool {
        self.proven == 0
    }

    /// Raise the watermark to `n`.
    ///
    /// Returns `true` if the watermark moved. A regression attempt leaves the
    /// watermark untouched and returns `false`.
    pub fn advance(&mut self, n: usize) -> bool {
        if n > self.proven {
            self.proven = n;
            true
        } else {
            false
        }
    }
}
