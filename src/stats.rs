//! Lock-free counters describing what a repeater did with its requests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time snapshot of a repeater's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepeaterStats {
    /// Requests with no key, sent straight to the inner service.
    pub passthrough: u64,
    /// Requests answered with the trigger status without reaching the inner service.
    pub suppressed: u64,
    /// Keyed requests forwarded to the inner service with their status observed.
    pub observed: u64,
    /// Observed responses that matched the trigger and (re)armed suppression.
    pub armed: u64,
}

impl RepeaterStats {
    /// Requests that reached the inner service.
    pub fn forwarded(&self) -> u64 {
        self.passthrough + self.observed
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    passthrough: AtomicU64,
    suppressed: AtomicU64,
    observed: AtomicU64,
    armed: AtomicU64,
}

impl Counters {
    pub(crate) fn passthrough(&self) {
        self.passthrough.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn suppressed(&self) {
        self.suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn observed(&self) {
        self.observed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn armed(&self) {
        self.armed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> RepeaterStats {
        RepeaterStats {
            passthrough: self.passthrough.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            observed: self.observed.load(Ordering::Relaxed),
            armed: self.armed.load(Ordering::Relaxed),
        }
    }
}
