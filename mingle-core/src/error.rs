//! Error types for MINGLE data-layer operations

use crate::EntityType;
use thiserror::Error;

/// Failures surfaced by remote fetches and record decoding.
///
/// The freshness tracker itself never raises errors; everything here
/// originates from the remote source or the decode step. The cache layer
/// performs no retries - retry policy belongs to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: EntityType, id: String },

    #[error("Transport failure: {reason}")]
    Transport { reason: String },

    #[error("Decode failed for {entity_type} with id {id}: {reason}")]
    Decode {
        entity_type: EntityType,
        id: String,
        reason: String,
    },
}

impl FetchError {
    /// Shorthand for a not-found failure.
    pub fn not_found(entity_type: EntityType, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Shorthand for a transport failure.
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Shorthand for a decode failure.
    pub fn decode(
        entity_type: EntityType,
        id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Decode {
            entity_type,
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// True for failures of the remote call itself (as opposed to decoding).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Result type alias for MINGLE data-layer operations.
pub type MingleResult<T> = Result<T, FetchError>;
