//! MINGLE Cache - Read-Through Caching with Freshness Contracts
//!
//! The data-access core shared by all MINGLE clients: a per-key freshness
//! tracker deciding whether a fetch may be served locally, and a per-entity
//! in-memory cache that deduplicates decoded domain objects across consumers.
//!
//! # Design Philosophy
//!
//! Staleness is explicit, not hidden. Every read is gated by a
//! caller-visible freshness window, and [`CacheRead<T>`] carries hit/miss
//! and fetch-time metadata for callers that want to inspect it.
//!
//! # Control Flow
//!
//! A caller wants an entity or query result. The [`FreshnessTracker`] is
//! consulted first: if the key is fresh, the read is served locally with no
//! network I/O. If not, the remote source is fetched, the tracker's
//! timestamp for that key is updated, and the decoded result lands in the
//! in-memory map where every consumer shares one canonical copy.
//!
//! # Example
//!
//! ```ignore
//! let freshness = Arc::new(FreshnessTracker::with_system_clock());
//! let events: EntityCache<Event> =
//!     EntityCache::new(remote, persisted, freshness, CacheConfig::default());
//!
//! // Served from memory when fresh, fetched remotely when not.
//! let event = events.get("e1").await?;
//!
//! // Callers that care can inspect how the read was satisfied.
//! let read = events.get_read("e1").await?;
//! if read.was_cache_miss() {
//!     tracing::debug!("went to the network");
//! }
//! ```

pub mod clock;
pub mod entity_cache;
pub mod freshness;
pub mod store;
pub mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entity_cache::{CacheConfig, EntityCache};
pub use freshness::{CacheRead, FreshnessTracker};
pub use store::InMemoryQueryStore;
pub use traits::{decode_record, CacheStats, CacheableEntity, PersistedStore, RawRecord, RemoteSource};
