//! In-memory persisted-store implementation.
//!
//! Stands in for the platform's on-disk query cache in tests and demos.
//! Uses tokio::sync::RwLock for safe async access.

use crate::traits::{PersistedStore, RawRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory [`PersistedStore`] keyed by canonical query key.
#[derive(Debug, Default)]
pub struct InMemoryQueryStore {
    queries: RwLock<HashMap<String, Vec<RawRecord>>>,
}

impl InMemoryQueryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of query keys currently persisted.
    pub async fn len(&self) -> usize {
        self.queries.read().await.len()
    }

    /// True if nothing has been persisted.
    pub async fn is_empty(&self) -> bool {
        self.queries.read().await.is_empty()
    }

    /// Drop everything (reinstall / logout simulation in tests).
    pub async fn clear(&self) {
        self.queries.write().await.clear();
    }
}

#[async_trait]
impl PersistedStore for InMemoryQueryStore {
    async fn read_query(&self, query_key: &str) -> Vec<RawRecord> {
        self.queries
            .read()
            .await
            .get(query_key)
            .cloned()
            .unwrap_or_default()
    }

    async fn write_query(&self, query_key: &str, records: &[RawRecord]) {
        self.queries
            .write()
            .await
            .insert(query_key.to_string(), records.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_read_unknown_key_is_empty() {
        let store = InMemoryQueryStore::new();
        assert!(store.read_query("events?host_id==h1").await.is_empty());
    }

    #[tokio::test]
    async fn test_write_then_read_roundtrip() {
        let store = InMemoryQueryStore::new();
        let records = vec![
            RawRecord::new("e1", json!({"title": "a"})),
            RawRecord::new("e2", json!({"title": "b"})),
        ];

        store.write_query("events?host_id==h1", &records).await;
        let read_back = store.read_query("events?host_id==h1").await;
        assert_eq!(read_back, records);
    }

    #[tokio::test]
    async fn test_write_replaces_previous_records() {
        let store = InMemoryQueryStore::new();
        let key = "events?host_id==h1";

        store
            .write_query(key, &[RawRecord::new("e1", json!({}))])
            .await;
        store
            .write_query(key, &[RawRecord::new("e2", json!({}))])
            .await;

        let records = store.read_query(key).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "e2");
    }

    #[tokio::test]
    async fn test_clear_empties_store() {
        let store = InMemoryQueryStore::new();
        store
            .write_query("k", &[RawRecord::new("e1", json!({}))])
            .await;
        assert_eq!(store.len().await, 1);

        store.clear().await;
        assert!(store.is_empty().await);
    }
}
