//! List and detail endpoints for REST resources
//!
//! Endpoints expose the verbs of a resource as plain async methods that take
//! parsed request data and return JSON values or errors. The HTTP layer in
//! [`routes`](crate::routes) is a thin adapter over them, so endpoints can be
//! driven directly from tests or other transports.
//!
//! # Features
//!
//! - **List**: [`ListEndpoint`] with pagination, filtering, ordering and soft delete stages
//! - **Detail**: [`DetailEndpoint`] with GET, PUT, PATCH and DELETE
//! - **Deletes**: [`HardDelete`] or idempotent [`SoftDelete`] strategies
//! - **Field policy**: [`FieldPolicy`] for write-protected and hidden fields
//! - **Error Handling**: [`ApiError`] with automatic HTTP status code mapping
//!
//! # Example
//!
//! ```rust
//! use acton_restless::handlers::{DetailEndpoint, ListEndpoint};
//! use acton_restless::repository::{MemoryStore, Resource, SoftDeletable};
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Post {
//!     id: u64,
//!     body: String,
//!     #[serde(default)]
//!     deleted: bool,
//! }
//!
//! impl Resource for Post {
//!     type Id = u64;
//!     const NAME: &'static str = "Post";
//!     const FIELDS: &'static [&'static str] = &["id", "body", "deleted"];
//!
//!     fn id(&self) -> u64 {
//!         self.id
//!     }
//! }
//!
//! impl SoftDeletable for Post {
//!     fn is_deleted(&self) -> bool {
//!         self.deleted
//!     }
//!
//!     fn mark_deleted(&mut self) {
//!         self.deleted = true;
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let store = MemoryStore::<Post>::new();
//! let list = ListEndpoint::builder(store.clone()).soft_delete().build();
//! let detail = DetailEndpoint::builder(store).soft_delete().build();
//!
//! let payload = json!({"id": 1, "body": "hello"});
//! list.post(payload.as_object().unwrap().clone()).await.unwrap();
//!
//! detail.delete(&1).await.unwrap();
//! assert_eq!(list.get(&Default::default()).await.unwrap().total, 0);
//! # });
//! ```

mod delete;
mod detail;
mod error;
mod fields;
mod list;

// Re-export all public types
pub use delete::{DeleteStrategy, HardDelete, SoftDelete};
pub use detail::{DetailEndpoint, DetailEndpointBuilder};
pub use error::{ApiError, ApiErrorKind, ApiOperation};
pub use fields::FieldPolicy;
pub use list::{ListEndpoint, ListEndpointBuilder};
