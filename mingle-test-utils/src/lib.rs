//! MINGLE Test Utilities
//!
//! Centralized test infrastructure for the MINGLE workspace:
//! - Entity fixtures with deterministic timestamps
//! - Raw-record builders
//! - A scripted mock remote source with call counting and failure injection

// Re-export the pieces tests reach for most, so a test file usually only
// needs this crate plus the code under test.
pub use mingle_cache::{
    CacheConfig, CacheRead, CacheStats, CacheableEntity, Clock, EntityCache, FreshnessTracker,
    InMemoryQueryStore, ManualClock, PersistedStore, RawRecord, RemoteSource, SystemClock,
};
pub use mingle_core::{
    EntityType, Event, FetchError, FilterClause, FilterOperator, Host, MingleResult, QueryFilter,
    SortDirection, Timestamp, User,
};

use async_trait::async_trait;
use chrono::TimeZone;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

// ============================================================================
// FIXTURES
// ============================================================================

/// A fixed instant all fixtures share, so tests never depend on wall time.
pub fn fixed_time() -> Timestamp {
    chrono::Utc
        .with_ymd_and_hms(2025, 5, 1, 0, 0, 0)
        .single()
        .expect("fixture timestamp is valid")
}

/// A user fixture with the given id.
pub fn sample_user(id: &str) -> User {
    User {
        user_id: id.to_string(),
        display_name: format!("User {}", id),
        handle: id.to_string(),
        bio: None,
        avatar_url: None,
        following_host_ids: Vec::new(),
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

/// An event fixture with the given id, owned by `host_id`.
pub fn sample_event(id: &str, host_id: &str) -> Event {
    Event {
        event_id: id.to_string(),
        host_id: host_id.to_string(),
        title: format!("Event {}", id),
        description: None,
        venue_name: "The Terrace".to_string(),
        starts_at: fixed_time() + chrono::Duration::days(30),
        ends_at: fixed_time() + chrono::Duration::days(30) + chrono::Duration::hours(4),
        capacity: Some(80),
        attendee_count: 0,
        cover_image_url: None,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

/// A host fixture with the given id, owned by user `u-owner`.
pub fn sample_host(id: &str) -> Host {
    Host {
        host_id: id.to_string(),
        name: format!("Host {}", id),
        bio: None,
        owner_user_id: "u-owner".to_string(),
        follower_count: 0,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

/// Encode an entity into the raw record the remote would return for it.
pub fn record_for<T: CacheableEntity>(entity: &T) -> RawRecord {
    let data = serde_json::to_value(entity).expect("fixture entity serializes");
    RawRecord::new(entity.entity_id(), data)
}

/// A record whose payload will not decode into any entity type.
pub fn malformed_record(id: &str) -> RawRecord {
    RawRecord::new(id, serde_json::json!({"unexpected": true}))
}

// ============================================================================
// MOCK REMOTE SOURCE
// ============================================================================

/// Scripted [`RemoteSource`] for tests.
///
/// Documents and query results are installed up front; every fetch is
/// counted, and transport failures can be switched on to simulate an
/// outage mid-test.
#[derive(Default)]
pub struct MockRemoteSource {
    docs: Mutex<HashMap<String, RawRecord>>,
    queries: Mutex<HashMap<String, Vec<RawRecord>>>,
    id_fetches: AtomicU64,
    query_fetches: AtomicU64,
    fail_transport: AtomicBool,
}

impl MockRemoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn doc_key(entity_type: EntityType, id: &str) -> String {
        format!("{}/{}", entity_type.as_str(), id)
    }

    /// Install an entity as a fetchable document.
    pub fn insert_entity<T: CacheableEntity>(&self, entity: &T) {
        self.insert_record(T::entity_type(), record_for(entity));
    }

    /// Install a raw record (e.g. a malformed one) as a fetchable document.
    pub fn insert_record(&self, entity_type: EntityType, record: RawRecord) {
        let key = Self::doc_key(entity_type, &record.id);
        self.docs.lock().unwrap().insert(key, record);
    }

    /// Script the result set for a query.
    pub fn script_query(&self, filter: &QueryFilter, records: Vec<RawRecord>) {
        self.queries
            .lock()
            .unwrap()
            .insert(filter.canonical_key(), records);
    }

    /// Simulate (or end) a network outage.
    pub fn set_fail_transport(&self, fail: bool) {
        self.fail_transport.store(fail, Ordering::SeqCst);
    }

    /// How many point-fetches have been issued.
    pub fn id_fetches(&self) -> u64 {
        self.id_fetches.load(Ordering::SeqCst)
    }

    /// How many query fetches have been issued.
    pub fn query_fetches(&self) -> u64 {
        self.query_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteSource for MockRemoteSource {
    async fn fetch_by_id(&self, entity_type: EntityType, id: &str) -> MingleResult<RawRecord> {
        self.id_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_transport.load(Ordering::SeqCst) {
            return Err(FetchError::transport("mock outage"));
        }
        self.docs
            .lock()
            .unwrap()
            .get(&Self::doc_key(entity_type, id))
            .cloned()
            .ok_or_else(|| FetchError::not_found(entity_type, id))
    }

    async fn fetch_by_query(&self, filter: &QueryFilter) -> MingleResult<Vec<RawRecord>> {
        self.query_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_transport.load(Ordering::SeqCst) {
            return Err(FetchError::transport("mock outage"));
        }
        Ok(self
            .queries
            .lock()
            .unwrap()
            .get(&filter.canonical_key())
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_are_deterministic() {
        assert_eq!(sample_user("u1"), sample_user("u1"));
        assert_eq!(sample_event("e1", "h1"), sample_event("e1", "h1"));
        assert_eq!(sample_host("h1"), sample_host("h1"));
    }

    #[test]
    fn test_record_for_roundtrips() {
        let event = sample_event("e1", "h1");
        let record = record_for(&event);
        assert_eq!(record.id, "e1");

        let decoded: Event =
            serde_json::from_value(record.data).expect("fixture record decodes");
        assert_eq!(decoded, event);
    }

    #[tokio::test]
    async fn test_mock_remote_serves_and_counts() {
        let remote = MockRemoteSource::new();
        remote.insert_entity(&sample_host("h1"));

        let record = remote
            .fetch_by_id(EntityType::Host, "h1")
            .await
            .expect("doc should be served");
        assert_eq!(record.id, "h1");
        assert_eq!(remote.id_fetches(), 1);

        let missing = remote.fetch_by_id(EntityType::Host, "h2").await;
        assert!(matches!(missing, Err(FetchError::NotFound { .. })));
        assert_eq!(remote.id_fetches(), 2);
    }

    #[tokio::test]
    async fn test_mock_remote_outage() {
        let remote = MockRemoteSource::new();
        remote.insert_entity(&sample_host("h1"));
        remote.set_fail_transport(true);

        let err = remote.fetch_by_id(EntityType::Host, "h1").await.unwrap_err();
        assert!(err.is_transport());
    }
}
