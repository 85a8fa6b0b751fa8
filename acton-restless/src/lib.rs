//! # acton-restless
//!
//! Composable list and detail endpoints for REST resources, layered over a
//! lazily evaluated query backend.
//!
//! ## Features
//!
//! - **Pagination**: `_limit` / `_offset` windows with a `{total, count, results}` envelope
//! - **Ordering**: `_orderby=field` or `_orderby=-field`
//! - **Filtering**: `field=value`, `field__in=a,b`, `field__not_in=a,b`, and lookups such as `field__gte=3`
//! - **Soft delete**: deleted records vanish from lists, the flag is hidden and write-protected
//! - **Backends**: any [`RecordStore`](repository::RecordStore); an in-memory store ships with the crate
//! - **HTTP**: an axum router per resource
//!
//! ## Example
//!
//! ```rust,no_run
//! use acton_restless::prelude::*;
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
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Load configuration
//!     let config = Config::load()?;
//!
//!     // Initialize tracing
//!     init_tracing(&config)?;
//!
//!     let store = MemoryStore::<Book>::new();
//!     let books = ListEndpoint::builder(store.clone())
//!         .paginator(config.paginator())
//!         .soft_delete()
//!         .filtering()
//!         .ordering()
//!         .build();
//!     let book = DetailEndpoint::builder(store).soft_delete().build();
//!
//!     let app = Router::new().nest("/books", resource_router(books, book));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod pagination;
pub mod params;
pub mod repository;
pub mod routes;
pub mod stages;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, PaginationConfig, ServiceConfig};
    pub use crate::error::{Error, Result};
    pub use crate::handlers::{
        ApiError, ApiErrorKind, ApiOperation, DeleteStrategy, DetailEndpoint, FieldPolicy,
        HardDelete, ListEndpoint, SoftDelete,
    };
    pub use crate::observability::init_tracing;
    pub use crate::pagination::{Paginator, ResultEnvelope};
    pub use crate::params::RequestParams;
    pub use crate::repository::{
        FilterCondition, Lookup, MemoryStore, OrderBy, Payload, QuerySet, RecordStore,
        RepositoryError, Resource, SoftDeletable,
    };
    pub use crate::routes::resource_router;
    pub use crate::stages::{Ordering, Pipeline, QueryFilter, QueryStage, SoftDeleteFilter};

    pub use axum::Router;
}
