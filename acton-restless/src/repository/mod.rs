//! Query and persistence abstractions endpoints are built on
//!
//! Endpoints never talk to a database directly. They assemble a [`QuerySet`]
//! obtained from a [`RecordStore`], and persist writes through the same store.
//! Any backend that implements these two traits can sit underneath; the crate
//! ships [`MemoryStore`] as a reference implementation.
//!
//! # Features
//!
//! - **Resources**: [`Resource`] and [`SoftDeletable`] describe record types
//! - **Lazy queries**: [`QuerySet`] with filter, exclude, order, slice, count, fetch
//! - **Conditions**: [`FilterCondition`] with [`Lookup`] suffixes (`__gte`, `__in`, ...)
//! - **Windowing**: [`Window`] for limit/offset slices
//! - **Errors**: [`RepositoryError`] with operation context
//!
//! # Example
//!
//! ```rust
//! use acton_restless::repository::{FilterCondition, MemoryStore, QuerySet, RecordStore, Resource};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Tag {
//!     id: u32,
//!     label: String,
//! }
//!
//! impl Resource for Tag {
//!     type Id = u32;
//!     const NAME: &'static str = "Tag";
//!     const FIELDS: &'static [&'static str] = &["id", "label"];
//!
//!     fn id(&self) -> u32 {
//!         self.id
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let store = MemoryStore::with_records(vec![
//!     Tag { id: 1, label: "rust".into() },
//!     Tag { id: 2, label: "web".into() },
//! ]);
//! let query = store.query().filter(&[FilterCondition::eq("label", "web")]).unwrap();
//! assert_eq!(query.count().await.unwrap(), 1);
//! # });
//! ```

mod condition;
mod error;
mod memory;
mod traits;

// Re-export all public types
pub use condition::{
    root_segment, split_list, FilterCondition, FilterValue, Lookup, OrderBy, OrderDirection,
    Window, PATH_SEPARATOR,
};
pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use memory::{MemoryQuerySet, MemoryStore};
pub use traits::{Payload, QuerySet, RecordStore, RepositoryResult, Resource, SoftDeletable};
