//! Enum types for MINGLE entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity type discriminator for the three cached domain kinds.
///
/// Doubles as the namespace for cache keys: `as_str()` returns the remote
/// collection name, so a user and an event with the same document id never
/// collide in the freshness tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    User,
    Event,
    Host,
}

impl EntityType {
    /// Remote collection name for this entity type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::User => "users",
            EntityType::Event => "events",
            EntityType::Host => "hosts",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
