//! Clock abstraction for freshness decisions.
//!
//! All "now" reads in the cache layer go through an injected [`Clock`] so
//! freshness arithmetic is deterministic under test.

use chrono::Utc;
use mingle_core::Timestamp;
use std::sync::RwLock;
use std::time::Duration;

/// Source of "now" for freshness comparisons.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Manually driven clock for deterministic tests.
///
/// Time only moves when the test says so. `advance` and `set` are the only
/// mutators; `set` may move time backward, which the freshness tracker must
/// tolerate without breaking its per-key monotonicity.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<Timestamp>,
}

impl ManualClock {
    /// Create a manual clock frozen at the given instant.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Create a manual clock frozen at the Unix epoch.
    pub fn at_epoch() -> Self {
        Self::new(Timestamp::UNIX_EPOCH)
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let delta = chrono::Duration::from_std(delta).unwrap_or_else(|_| chrono::Duration::zero());
        let mut now = self.now.write().unwrap();
        *now += delta;
    }

    /// Jump the clock to an arbitrary instant (may move backward).
    pub fn set(&self, to: Timestamp) {
        *self.now.write().unwrap() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.read().unwrap()
    }
}
