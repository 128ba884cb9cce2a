//! Freshness tracking for cache reads.
//!
//! Records, per query or document key, when data was last fetched from the
//! authoritative remote source, and answers whether a cached read is still
//! usable for a caller-specified freshness window. Callers "sign the
//! waiver" by supplying the window; the tracker never decides policy.

use crate::clock::{Clock, SystemClock};
use mingle_core::Timestamp;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Per-key last-fetch bookkeeping.
///
/// Pure in-memory state with process lifetime: records are created on the
/// first successful remote fetch for a key, overwritten on every subsequent
/// one, and removed only by [`reset`](Self::reset). A key's timestamp is
/// monotonically non-decreasing even if the injected clock moves backward.
///
/// This component cannot fail and performs no I/O; failure handling belongs
/// to whoever performs the actual remote fetch.
pub struct FreshnessTracker {
    records: RwLock<HashMap<String, Timestamp>>,
    clock: Arc<dyn Clock>,
}

impl FreshnessTracker {
    /// Create a tracker reading time from the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Create a tracker on the system wall clock.
    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Is the data recorded under `key` still fresh for `window`?
    ///
    /// True iff a record exists and `now - last_fetched_at <= window`
    /// (inclusive boundary). A key never fetched is always stale: the first
    /// access forces a remote fetch. A zero window keeps data fresh only at
    /// the recording instant itself, which callers use deliberately to
    /// deduplicate near-simultaneous fetches while otherwise always going
    /// remote.
    ///
    /// No side effects.
    pub fn is_fresh(&self, key: &str, window: Duration) -> bool {
        let records = self.records.read().unwrap();
        let Some(last_fetched_at) = records.get(key) else {
            return false;
        };
        let elapsed = self
            .clock
            .now()
            .signed_duration_since(*last_fetched_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        elapsed <= window
    }

    /// Record a successful remote fetch for `key` at the current time.
    ///
    /// Must be called only after the remote call succeeds; a failed fetch
    /// must not mark its key fresh. If the clock reads earlier than the
    /// key's existing record, the record is left untouched so per-key
    /// timestamps never move backward. Returns the timestamp now recorded.
    pub fn mark_fetched(&self, key: &str) -> Timestamp {
        let now = self.clock.now();
        let mut records = self.records.write().unwrap();
        let entry = records.entry(key.to_string()).or_insert(now);
        if now > *entry {
            *entry = now;
        }
        *entry
    }

    /// When `key` was last fetched, if ever.
    pub fn last_fetched_at(&self, key: &str) -> Option<Timestamp> {
        self.records.read().unwrap().get(key).copied()
    }

    /// Current time on the tracker's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Number of keys with a recorded fetch.
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// True if no key has ever been marked fetched.
    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }

    /// Drop every record (explicit application-level reset, e.g. logout).
    pub fn reset(&self) {
        self.records.write().unwrap().clear();
    }
}

/// Result of a cache read, carrying hit/miss and fetch-time metadata.
///
/// Callers that only want the value use [`into_value`](Self::into_value);
/// the wrapper exists so consumers can tell whether a read touched the
/// network and how old the underlying fetch is.
#[derive(Debug, Clone)]
pub struct CacheRead<T> {
    value: T,
    fetched_at: Timestamp,
    was_cache_hit: bool,
}

impl<T> CacheRead<T> {
    /// Wrap a value served from the in-memory cache.
    pub fn hit(value: T, fetched_at: Timestamp) -> Self {
        Self {
            value,
            fetched_at,
            was_cache_hit: true,
        }
    }

    /// Wrap a value that was just fetched from the remote source.
    pub fn miss(value: T, fetched_at: Timestamp) -> Self {
        Self {
            value,
            fetched_at,
            was_cache_hit: false,
        }
    }

    /// Consume the wrapper and return the underlying value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Get a reference to the underlying value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// When the value was last fetched from the remote source.
    pub fn fetched_at(&self) -> Timestamp {
        self.fetched_at
    }

    /// Check if this read was served without remote I/O.
    pub fn was_cache_hit(&self) -> bool {
        self.was_cache_hit
    }

    /// Check if this read went to the remote source.
    pub fn was_cache_miss(&self) -> bool {
        !self.was_cache_hit
    }

    /// Map the inner value to a new type, keeping the metadata.
    pub fn map<U, F>(self, f: F) -> CacheRead<U>
    where
        F: FnOnce(T) -> U,
    {
        CacheRead {
            value: f(self.value),
            fetched_at: self.fetched_at,
            was_cache_hit: self.was_cache_hit,
        }
    }
}

impl<T> AsRef<T> for CacheRead<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::clock::ManualClock;
    use proptest::prelude::*;

    proptest! {
        /// Immediately after marking, a key is fresh for any window.
        #[test]
        fn prop_fresh_after_mark_for_any_window(window_secs in 0u64..100_000) {
            let clock = Arc::new(ManualClock::at_epoch());
            let tracker = FreshnessTracker::new(clock);
            tracker.mark_fetched("k");
            prop_assert!(tracker.is_fresh("k", Duration::from_secs(window_secs)));
        }

        /// Per-key timestamps never decrease, whatever the clock does.
        #[test]
        fn prop_mark_fetched_is_monotonic(jumps in proptest::collection::vec(-50_000i64..50_000, 1..20)) {
            let clock = Arc::new(ManualClock::at_epoch());
            let tracker = FreshnessTracker::new(clock.clone());

            let mut previous = tracker.mark_fetched("k");
            for jump in jumps {
                clock.set(Timestamp::UNIX_EPOCH + chrono::Duration::seconds(jump));
                let recorded = tracker.mark_fetched("k");
                prop_assert!(recorded >= previous);
                previous = recorded;
            }
        }

        /// Freshness holds exactly up to the window and not past it.
        #[test]
        fn prop_freshness_boundary(window_secs in 0u64..10_000, past_by in 1u64..10_000) {
            let clock = Arc::new(ManualClock::at_epoch());
            let tracker = FreshnessTracker::new(clock.clone());
            tracker.mark_fetched("k");

            clock.advance(Duration::from_secs(window_secs));
            prop_assert!(tracker.is_fresh("k", Duration::from_secs(window_secs)));

            clock.advance(Duration::from_secs(past_by));
            prop_assert!(!tracker.is_fresh("k", Duration::from_secs(window_secs)));
        }
    }
}
