//! Read-through entity cache.
//!
//! This module implements the core caching logic: freshness-gated point
//! lookups, batch queries served from the persisted store while fresh, and
//! the shared in-memory map that gives every consumer one canonical copy of
//! each decoded entity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use mingle_core::{MingleResult, QueryFilter};

use crate::freshness::{CacheRead, FreshnessTracker};
use crate::traits::{decode_record, CacheStats, CacheableEntity, PersistedStore, RawRecord, RemoteSource};

/// Configuration for the entity cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Freshness window for point lookups by id.
    pub freshness_window: Duration,
    /// Freshness window for batch query keys.
    pub query_freshness_window: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness_window: Duration::from_secs(7200), // 2 hours
            query_freshness_window: Duration::from_secs(900), // 15 minutes
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the freshness window for point lookups.
    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    /// Set the freshness window for batch queries.
    pub fn with_query_freshness_window(mut self, window: Duration) -> Self {
        self.query_freshness_window = window;
        self
    }
}

#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    remote_fetches: AtomicU64,
    invalidations: AtomicU64,
}

/// Read-through cache for one entity kind.
///
/// Constructed explicitly and injected into callers together with its
/// collaborators; there are no process-global instances. One `EntityCache`
/// per entity kind shares a [`FreshnessTracker`] with its siblings.
///
/// # Concurrency
///
/// Map and tracker accesses are synchronous and never held across an
/// `.await`; the remote fetch is the only suspension point. Concurrent
/// fetches for the same id are tolerated: whichever completes last leaves
/// its value in the map, even when a slower fetch started earlier.
/// Abandoned callers do not suppress their writes.
///
/// # Growth
///
/// Entries are never evicted by size or age. They leave the map only via
/// [`invalidate`](Self::invalidate), [`clear`](Self::clear), or process
/// exit.
pub struct EntityCache<T: CacheableEntity> {
    entries: RwLock<HashMap<String, T>>,
    freshness: Arc<FreshnessTracker>,
    remote: Arc<dyn RemoteSource>,
    persisted: Arc<dyn PersistedStore>,
    config: CacheConfig,
    counters: CacheCounters,
}

impl<T: CacheableEntity> EntityCache<T> {
    /// Create a new entity cache.
    pub fn new(
        remote: Arc<dyn RemoteSource>,
        persisted: Arc<dyn PersistedStore>,
        freshness: Arc<FreshnessTracker>,
        config: CacheConfig,
    ) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            freshness,
            remote,
            persisted,
            config,
            counters: CacheCounters::default(),
        }
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Freshness key for a single entity: collection name plus document id.
    fn id_key(id: &str) -> String {
        format!("{}/{}", T::entity_type().as_str(), id)
    }

    /// Get an entity by id, fetching remotely when stale or absent.
    pub async fn get(&self, id: &str) -> MingleResult<T> {
        self.get_read(id).await.map(CacheRead::into_value)
    }

    /// Get an entity by id, with hit/miss and fetch-time metadata.
    ///
    /// Served from memory iff an in-memory value exists AND its key is
    /// fresh for the configured window; otherwise a remote point-fetch is
    /// issued, the decoded value overwrites the map entry, and the key is
    /// marked fetched. On any failure the map and the freshness record are
    /// left exactly as they were.
    pub async fn get_read(&self, id: &str) -> MingleResult<CacheRead<T>> {
        let key = Self::id_key(id);

        if self.freshness.is_fresh(&key, self.config.freshness_window) {
            let cached = self.entries.read().unwrap().get(id).cloned();
            if let Some(value) = cached {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "cache hit");
                let fetched_at = self
                    .freshness
                    .last_fetched_at(&key)
                    .unwrap_or_else(|| self.freshness.now());
                return Ok(CacheRead::hit(value, fetched_at));
            }
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key = %key, "cache miss, fetching");

        let record = self.remote.fetch_by_id(T::entity_type(), id).await?;
        self.counters.remote_fetches.fetch_add(1, Ordering::Relaxed);

        // Decode failures are fatal for point lookups; nothing is written.
        let entity: T = decode_record(record)?;

        self.entries
            .write()
            .unwrap()
            .insert(id.to_string(), entity.clone());
        let fetched_at = self.freshness.mark_fetched(&key);

        Ok(CacheRead::miss(entity, fetched_at))
    }

    /// Fetch every entity matching `filter`, read-through on the query key.
    ///
    /// While the canonical query key is fresh the persisted store serves
    /// the read with no remote I/O. When stale, the remote query runs, its
    /// raw results are persisted, each decoded entity is merged into the
    /// in-memory map (point lookups benefit from batch fetches), and the
    /// query key is marked fetched once the whole batch has succeeded.
    ///
    /// A record that fails to decode is dropped from the result and logged;
    /// the batch itself still counts as a successful fetch. Result order is
    /// the remote's and is never changed by the merge.
    pub async fn fetch_query(&self, filter: &QueryFilter) -> MingleResult<Vec<T>> {
        debug_assert_eq!(
            filter.entity_type,
            T::entity_type(),
            "query filter targets a different collection than this cache"
        );
        let key = filter.canonical_key();

        if self.freshness.is_fresh(&key, self.config.query_freshness_window) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key = %key, "query fresh, serving persisted records");
            let records = self.persisted.read_query(&key).await;
            return Ok(Self::decode_dropping_failures(records));
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key = %key, "query stale, fetching");

        let records = self.remote.fetch_by_query(filter).await?;
        self.counters.remote_fetches.fetch_add(1, Ordering::Relaxed);
        self.persisted.write_query(&key, &records).await;

        let entities = Self::decode_dropping_failures::<T>(records);
        {
            let mut entries = self.entries.write().unwrap();
            for entity in &entities {
                entries.insert(entity.entity_id().to_string(), entity.clone());
            }
        }
        // The batch authoritatively fetched each merged entity, so their id
        // keys are marked along with the query key.
        for entity in &entities {
            self.freshness.mark_fetched(&Self::id_key(entity.entity_id()));
        }
        self.freshness.mark_fetched(&key);

        Ok(entities)
    }

    fn decode_dropping_failures<E: CacheableEntity>(records: Vec<RawRecord>) -> Vec<E> {
        records
            .into_iter()
            .filter_map(|record| match decode_record::<E>(record) {
                Ok(entity) => Some(entity),
                Err(err) => {
                    tracing::warn!(error = %err, "dropping undecodable record from batch");
                    None
                }
            })
            .collect()
    }

    /// Seed the cache after a local mutation (write-through).
    ///
    /// The entity becomes the in-memory value for its id and the id key is
    /// marked fetched, so readers see the edit without a refetch.
    pub fn insert(&self, entity: T) {
        let id = entity.entity_id().to_string();
        let key = Self::id_key(&id);
        self.entries.write().unwrap().insert(id, entity);
        self.freshness.mark_fetched(&key);
    }

    /// Read the in-memory value for `id` without any I/O or freshness check.
    pub fn peek(&self, id: &str) -> Option<T> {
        self.entries.read().unwrap().get(id).cloned()
    }

    /// Drop the in-memory entry for `id`.
    ///
    /// The next [`get`](Self::get) finds no value and refetches regardless
    /// of the freshness record. Used after local mutations so the cache
    /// never serves stale self-data.
    pub fn invalidate(&self, id: &str) {
        let removed = self.entries.write().unwrap().remove(id);
        if removed.is_some() {
            self.counters.invalidations.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key = %Self::id_key(id), "invalidated");
        }
    }

    /// Drop every in-memory entry (logout path).
    ///
    /// Callers pair this with [`FreshnessTracker::reset`] to also forget
    /// fetch history.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    /// Number of entities currently held in memory.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// True if no entity is held in memory.
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            remote_fetches: self.counters.remote_fetches.load(Ordering::Relaxed),
            invalidations: self.counters.invalidations.load(Ordering::Relaxed),
            entry_count: self.len() as u64,
        }
    }
}
