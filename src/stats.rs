//! Decision counters for operational visibility.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the decision counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecisionStats {
    /// Decisions answered `true` because the policy was enabled.
    pub honored: u64,
    /// Decisions answered `true` by the forced-fsync floor.
    pub forced: u64,
    /// Decisions answered `false`.
    pub skipped: u64,
}

impl DecisionStats {
    /// Total number of decisions counted.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.honored + self.forced + self.skipped
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    honored: AtomicU64,
    forced: AtomicU64,
    skipped: AtomicU64,
}

impl Counters {
    pub(crate) fn record_honored(&self) {
        self.honored.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_forced(&self) {
        self.forced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> DecisionStats {
        DecisionStats {
            honored: self.honored.load(Ordering::Relaxed),
            forced: self.forced.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        self.honored.store(0, Ordering::Relaxed);
        self.forced.store(0, Ordering::Relaxed);
        self.skipped.store(0, Ordering::Relaxed);
    }
}
