//! MINGLE Core - Entity Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains ONLY data types - no business logic.

pub mod entities;
pub mod enums;
pub mod error;
pub mod filter;
pub mod identity;

pub use entities::{Event, Host, User};
pub use enums::EntityType;
pub use error::{FetchError, MingleResult};
pub use filter::{FilterClause, FilterOperator, QueryFilter, SortDirection};
pub use identity::Timestamp;
