//! Repository trait definitions
//!
//! The query and persistence backends endpoints are layered on, expressed with
//! RPITIT (Return Position Impl Trait In Traits) so implementations can use
//! plain `async fn`.
//!
//! # Overview
//!
//! - [`Resource`]: a serializable record type with an identifier and a field schema
//! - [`SoftDeletable`]: a resource carrying a `deleted` flag
//! - [`QuerySet`]: a lazy, chainable query handle (the query source)
//! - [`RecordStore`]: loads, persists, and removes records and hands out queries
//!
//! # Example
//!
//! ```rust
//! use acton_restless::repository::{Resource, SoftDeletable};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Book {
//!     id: u64,
//!     title: String,
//!     #[serde(default)]
//!     deleted: bool,
//! }
//!
//! impl Resource for Book {
//!     type Id = u64;
//!     const NAME: &'static str = "Book";
//!     const FIELDS: &'static [&'static str] = &["id", "title", "deleted"];
//!
//!     fn id(&self) -> u64 {
//!         self.id
//!     }
//! }
//!
//! impl SoftDeletable for Book {
//!     fn is_deleted(&self) -> bool {
//!         self.deleted
//!     }
//!
//!     fn mark_deleted(&mut self) {
//!         self.deleted = true;
//!     }
//! }
//! ```

use std::fmt;
use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::condition::{root_segment, FilterCondition, OrderBy, Window, PATH_SEPARATOR};
use super::error::RepositoryError;

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// JSON object payload supplied by a client write
pub type Payload = Map<String, Value>;

/// A record type endpoints can list, filter, and persist
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Identifier type, parsed from the request path
    type Id: Clone + Eq + fmt::Display + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Resource name used in error messages and logs
    const NAME: &'static str;

    /// Top-level field names that may be filtered or ordered on
    const FIELDS: &'static [&'static str];

    /// Fields of nested objects reachable through `__` paths
    ///
    /// Each entry pairs a parent path with the fields of the object stored
    /// there: `("author", &["name"])` makes `author__name` a valid path, and
    /// `("author__address", &["city"])` extends it one level further.
    const NESTED_FIELDS: &'static [(&'static str, &'static [&'static str])] = &[];

    /// Name of the identifier field in the serialized record
    const ID_FIELD: &'static str = "id";

    /// The record's identifier
    fn id(&self) -> Self::Id;

    /// Whether every segment of a `__`-separated path is part of the schema
    ///
    /// ```rust
    /// # use acton_restless::repository::Resource;
    /// # #[derive(Clone, serde::Serialize, serde::Deserialize)]
    /// # struct Book { id: u64 }
    /// impl Resource for Book {
    ///     type Id = u64;
    ///     const NAME: &'static str = "Book";
    ///     const FIELDS: &'static [&'static str] = &["id", "title", "author"];
    ///     const NESTED_FIELDS: &'static [(&'static str, &'static [&'static str])] =
    ///         &[("author", &["name"])];
    ///
    ///     fn id(&self) -> u64 {
    ///         self.id
    ///     }
    /// }
    ///
    /// assert!(Book::has_path("author__name"));
    /// assert!(!Book::has_path("author__age"));
    /// assert!(!Book::has_path("title__nonsense"));
    /// ```
    fn has_path(path: &str) -> bool {
        let root = root_segment(path);
        if !Self::FIELDS.contains(&root) {
            return false;
        }

        let mut parent_len = root.len();
        for segment in path.split(PATH_SEPARATOR).skip(1) {
            let parent = &path[..parent_len];
            let known = Self::NESTED_FIELDS
                .iter()
                .any(|(nested, fields)| *nested == parent && fields.contains(&segment));
            if !known {
                return false;
            }
            parent_len += PATH_SEPARATOR.len() + segment.len();
        }
        true
    }
}

/// A resource that is marked deleted instead of being removed
///
/// The flag must be serialized as a boolean under
/// [`DELETED_FIELD`](Self::DELETED_FIELD), and [`Resource::FIELDS`] must list
/// that name, so list queries can filter on it. A flag skipped during
/// serialization makes every record invisible to soft-delete listings.
///
/// Clients never send the flag. Soft-delete endpoints write `false` into
/// create and replace payloads themselves, so the field needs no
/// `#[serde(default)]`.
pub trait SoftDeletable: Resource {
    /// Name of the flag in the serialized record
    const DELETED_FIELD: &'static str = "deleted";

    /// Whether the record has been soft-deleted
    fn is_deleted(&self) -> bool;

    /// Set the deleted flag; there is no way back through this trait
    fn mark_deleted(&mut self);
}

/// Lazy, chainable handle over a record collection
///
/// Builder methods consume the handle and return a new one; nothing touches
/// storage until [`count`](QuerySet::count) or [`fetch`](QuerySet::fetch).
pub trait QuerySet: Sized + Send + Sync {
    /// The record type the query yields
    type Record: Send;

    /// Whether `field` (a `__`-separated path) resolves in the resource schema
    fn has_field(&self, field: &str) -> bool;

    /// Keep records matching every condition
    fn filter(self, conditions: &[FilterCondition]) -> RepositoryResult<Self>;

    /// Drop records matching every condition
    fn exclude(self, conditions: &[FilterCondition]) -> RepositoryResult<Self>;

    /// Sort by a field path
    ///
    /// # Errors
    ///
    /// Returns an error of kind `InvalidField` when any segment of the path
    /// is not part of the resource schema.
    fn order_by(self, order: &OrderBy) -> RepositoryResult<Self>;

    /// Restrict to a window of results
    fn slice(self, window: Window) -> Self;

    /// Count matching records
    fn count(&self) -> impl Future<Output = RepositoryResult<u64>> + Send;

    /// Evaluate the query
    fn fetch(&self) -> impl Future<Output = RepositoryResult<Vec<Self::Record>>> + Send;
}

/// Persistence backend for a resource
pub trait RecordStore<R: Resource>: Send + Sync + 'static {
    /// Query handle type produced by [`query`](RecordStore::query)
    type Query: QuerySet<Record = R>;

    /// Unfiltered query over every stored record
    fn query(&self) -> Self::Query;

    /// Load a record by identifier
    fn get(&self, id: &R::Id) -> impl Future<Output = RepositoryResult<Option<R>>> + Send;

    /// Persist a loaded record, inserting it if its identifier is new
    fn save(&self, record: R) -> impl Future<Output = RepositoryResult<R>> + Send;

    /// Create a record from a client payload
    fn create(&self, payload: Payload) -> impl Future<Output = RepositoryResult<R>> + Send;

    /// Create or fully replace the record at `id`
    fn replace(
        &self,
        id: &R::Id,
        payload: Payload,
    ) -> impl Future<Output = RepositoryResult<R>> + Send;

    /// Merge a partial payload into the existing record at `id`
    ///
    /// # Errors
    ///
    /// Returns an error of kind `NotFound` when no record exists.
    fn merge(&self, id: &R::Id, payload: Payload)
        -> impl Future<Output = RepositoryResult<R>> + Send;

    /// Physically remove a record, returning whether it existed
    fn remove(&self, id: &R::Id) -> impl Future<Output = RepositoryResult<bool>> + Send;
}
