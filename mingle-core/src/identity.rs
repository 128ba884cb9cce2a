//! Identity types for MINGLE entities

use chrono::{DateTime, Utc};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

// Entity ids are plain `String`s. They are assigned by the remote document
// store and treated as opaque; nothing in this workspace mints ids locally.
