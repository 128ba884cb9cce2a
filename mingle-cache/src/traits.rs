//! Collaborator traits and the cacheable entity marker.
//!
//! The cache layer owns none of its collaborators: the remote document
//! store, the local persisted query store, and the decode step are all
//! behind traits so the surrounding application (and the tests) can supply
//! their own.

use async_trait::async_trait;
use mingle_core::{EntityType, Event, FetchError, Host, MingleResult, QueryFilter, User};
use serde::{de::DeserializeOwned, Serialize};

/// One raw document as returned by the remote source or the persisted
/// store, before decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Document id assigned by the remote store.
    pub id: String,
    /// Undecoded document payload.
    pub data: serde_json::Value,
}

impl RawRecord {
    /// Create a raw record from an id and payload.
    pub fn new(id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// Marker trait for types the cache can hold.
///
/// # Implementation Requirements
///
/// - `entity_type()` must return a consistent value for all instances
/// - `entity_id()` must return the remote-assigned id for this instance
/// - Implementations must be `Clone`, `Serialize`, and `DeserializeOwned`
/// - Implementations must be `Send + Sync + 'static` for async compatibility
pub trait CacheableEntity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Get the entity type for this cacheable.
    fn entity_type() -> EntityType;

    /// Get the unique identifier for this entity.
    fn entity_id(&self) -> &str;
}

impl CacheableEntity for User {
    fn entity_type() -> EntityType {
        EntityType::User
    }

    fn entity_id(&self) -> &str {
        &self.user_id
    }
}

impl CacheableEntity for Event {
    fn entity_type() -> EntityType {
        EntityType::Event
    }

    fn entity_id(&self) -> &str {
        &self.event_id
    }
}

impl CacheableEntity for Host {
    fn entity_type() -> EntityType {
        EntityType::Host
    }

    fn entity_id(&self) -> &str {
        &self.host_id
    }
}

/// Decode one raw record into its domain type.
///
/// Pure and per-record. A malformed payload maps to [`FetchError::Decode`];
/// whether that is fatal depends on the caller (fatal for point lookups,
/// dropped-and-logged inside batches).
pub fn decode_record<T: CacheableEntity>(record: RawRecord) -> MingleResult<T> {
    let RawRecord { id, data } = record;
    serde_json::from_value(data).map_err(|e| FetchError::decode(T::entity_type(), id, e.to_string()))
}

/// The authoritative remote document source.
///
/// Strongly consistent at the time of call; results of `fetch_by_query`
/// arrive in query order and the cache layer preserves that order.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Point-fetch one document by id.
    ///
    /// Errors with [`FetchError::NotFound`] when the document does not
    /// exist and [`FetchError::Transport`] on network/auth failure.
    async fn fetch_by_id(&self, entity_type: EntityType, id: &str) -> MingleResult<RawRecord>;

    /// Fetch every document matching `filter`.
    ///
    /// Errors with [`FetchError::Transport`] only; an empty match is an
    /// empty vec, not an error.
    async fn fetch_by_query(&self, filter: &QueryFilter) -> MingleResult<Vec<RawRecord>>;
}

/// Best-effort local store for batch query results.
///
/// Serves query reads while their freshness key is still fresh. May return
/// empty even when a freshness record exists (e.g. after a reinstall wiped
/// local data); callers must tolerate that.
#[async_trait]
pub trait PersistedStore: Send + Sync {
    /// Read the records last persisted under `query_key`.
    async fn read_query(&self, query_key: &str) -> Vec<RawRecord>;

    /// Replace the records persisted under `query_key`.
    async fn write_query(&self, query_key: &str, records: &[RawRecord]);
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served without remote I/O.
    pub hits: u64,
    /// Reads that had to consult the remote source.
    pub misses: u64,
    /// Remote calls actually issued.
    pub remote_fetches: u64,
    /// In-memory entries dropped by explicit invalidation.
    pub invalidations: u64,
    /// Number of entries currently in the in-memory map.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
