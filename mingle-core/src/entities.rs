//! Core entity structures
//!
//! Decoded domain objects as they arrive from the remote document store.
//! A value held by the cache is a snapshot: it may be stale relative to the
//! remote source until the next refresh.

use crate::Timestamp;
use serde::{Deserialize, Serialize};

/// User - an account on the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub display_name: String,
    /// Unique short name shown in profiles and mentions.
    pub handle: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    /// Hosts this user follows, by id.
    #[serde(default)]
    pub following_host_ids: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Event - a discoverable gathering published by a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub host_id: String,
    pub title: String,
    pub description: Option<String>,
    pub venue_name: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    /// Maximum attendance, if the host set one.
    pub capacity: Option<i32>,
    #[serde(default)]
    pub attendee_count: i32,
    pub cover_image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Host - an organizer account that publishes events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub host_id: String,
    pub name: String,
    pub bio: Option<String>,
    /// The user account that administers this host profile.
    pub owner_user_id: String,
    #[serde(default)]
    pub follower_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_user_roundtrips_through_json() {
        let user = User {
            user_id: "u1".to_string(),
            display_name: "Ada".to_string(),
            handle: "ada".to_string(),
            bio: None,
            avatar_url: None,
            following_host_ids: vec!["h1".to_string()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).expect("serialize should succeed");
        let decoded: User = serde_json::from_value(json).expect("decode should succeed");
        assert_eq!(user, decoded);
    }

    #[test]
    fn test_event_decodes_without_optional_fields() {
        let json = serde_json::json!({
            "event_id": "e1",
            "host_id": "h1",
            "title": "Rooftop Social",
            "description": null,
            "venue_name": "The Terrace",
            "starts_at": "2025-06-01T18:00:00Z",
            "ends_at": "2025-06-01T22:00:00Z",
            "capacity": null,
            "cover_image_url": null,
            "created_at": "2025-05-01T00:00:00Z",
            "updated_at": "2025-05-01T00:00:00Z",
        });

        let event: Event = serde_json::from_value(json).expect("decode should succeed");
        assert_eq!(event.event_id, "e1");
        assert_eq!(event.attendee_count, 0);
        assert!(event.capacity.is_none());
    }

    #[test]
    fn test_event_decode_rejects_missing_required_field() {
        // No host_id: the document is malformed.
        let json = serde_json::json!({
            "event_id": "e1",
            "title": "Rooftop Social",
            "venue_name": "The Terrace",
            "starts_at": "2025-06-01T18:00:00Z",
            "ends_at": "2025-06-01T22:00:00Z",
            "created_at": "2025-05-01T00:00:00Z",
            "updated_at": "2025-05-01T00:00:00Z",
        });

        assert!(serde_json::from_value::<Event>(json).is_err());
    }
}
