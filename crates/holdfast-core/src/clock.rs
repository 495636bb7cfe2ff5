// crates/holdfast-core/src/clock.rs
//
// Clock abstraction for the Holdfast staking engine.
//
// The engine never reads wall-clock time directly: every operation takes its
// timestamp from a `Clock` supplied at construction. The clock must be
// monotonic (it never decreases between two consecutive reads), and the
// engine reads it exactly once per operation, so every timestamp comparison
// inside one operation sees the same instant.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Engine time: seconds since an arbitrary epoch.
pub type Timestamp = u64;

/// Source of the current engine time.
pub trait Clock {
    /// The current time. Must be non-decreasing across calls.
    fn now(&self) -> Timestamp;
}

/// A manually advanced clock for tests and simulations.
///
/// Cloned handles share the same underlying time, so a test can hold a handle
/// and advance time while the engine owns its own clone.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock starting at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock starting at the given time.
    pub fn starting_at(now: Timestamp) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(now)),
        }
    }

    /// Advance the clock by `secs` seconds.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Jump the clock to an absolute time. Must not move backwards.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
