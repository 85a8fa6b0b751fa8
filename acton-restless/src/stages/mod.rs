//! Query-building stages for list endpoints
//!
//! A list endpoint assembles its query by passing the store's base
//! [`QuerySet`] through an ordered [`Pipeline`] of [`QueryStage`]s. Each stage
//! reads the request parameters it cares about and returns a refined query.
//! Stages never evaluate the query; pagination counts and fetches afterwards.
//!
//! # Example
//!
//! ```rust
//! use acton_restless::params::RequestParams;
//! use acton_restless::repository::{MemoryStore, QuerySet, RecordStore, Resource};
//! use acton_restless::stages::{Ordering, Pipeline, QueryFilter};
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
//!     Tag { id: 3, label: "rust".into() },
//! ]);
//!
//! let pipeline = Pipeline::new().with_stage(QueryFilter).with_stage(Ordering);
//! let params = RequestParams::from_iter([("label", "rust"), ("_orderby", "-id")]);
//!
//! let query = pipeline.run(store.query(), &params).unwrap();
//! let ids: Vec<u32> = query.fetch().await.unwrap().iter().map(|t| t.id).collect();
//! assert_eq!(ids, vec![3, 1]);
//! # });
//! ```

mod filtering;
mod ordering;
mod soft_delete;

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::params::RequestParams;
use crate::repository::QuerySet;

pub use filtering::{FilterSets, QueryFilter, IN_SUFFIX, NOT_IN_SUFFIX};
pub use ordering::Ordering;
pub use soft_delete::SoftDeleteFilter;

/// One query-rewriting step of an endpoint pipeline
///
/// Implement this to plug custom restrictions (tenancy, permissions, search)
/// into a list endpoint alongside the built-in stages.
pub trait QueryStage<Q>: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Refine `query` using the request parameters
    ///
    /// # Errors
    ///
    /// Stages fail on parameters they cannot honour, e.g. an ordering field
    /// outside the resource schema.
    fn apply(&self, query: Q, params: &RequestParams) -> Result<Q>;
}

/// Ordered list of stages applied to a base query
pub struct Pipeline<Q> {
    stages: Vec<Arc<dyn QueryStage<Q>>>,
}

impl<Q> Clone for Pipeline<Q> {
    fn clone(&self) -> Self {
        Self {
            stages: self.stages.clone(),
        }
    }
}

impl<Q: QuerySet> Default for Pipeline<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q> fmt::Debug for Pipeline<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}

impl<Q: QuerySet> Pipeline<Q> {
    /// Create an empty pipeline
    #[must_use]
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage; stages run in the order they were added
    #[must_use]
    pub fn with_stage(mut self, stage: impl QueryStage<Q> + 'static) -> Self {
        self.push(stage);
        self
    }

    /// Append a stage in place
    pub fn push(&mut self, stage: impl QueryStage<Q> + 'static) {
        self.stages.push(Arc::new(stage));
    }

    /// Names of the registered stages, in order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Pass `query` through every stage
    ///
    /// # Errors
    ///
    /// Stops at the first stage that fails and returns its error.
    pub fn run(&self, query: Q, params: &RequestParams) -> Result<Q> {
        self.stages.iter().try_fold(query, |query, stage| {
            tracing::trace!(stage = stage.name(), "applying query stage");
            stage.apply(query, params)
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde::{Deserialize, Serialize};

    use crate::repository::{MemoryStore, Resource, SoftDeletable};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub(crate) struct Author {
        pub(crate) name: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub(crate) struct Note {
        pub(crate) id: u64,
        pub(crate) title: String,
        pub(crate) rank: i64,
        pub(crate) author: Author,
        #[serde(default)]
        pub(crate) deleted: bool,
    }

    impl Resource for Note {
        type Id = u64;
        const NAME: &'static str = "Note";
        const FIELDS: &'static [&'static str] = &["id", "title", "rank", "author", "deleted"];
        const NESTED_FIELDS: &'static [(&'static str, &'static [&'static str])] =
            &[("author", &["name"])];

        fn id(&self) -> u64 {
            self.id
        }
    }

    impl SoftDeletable for Note {
        fn is_deleted(&self) -> bool {
            self.deleted
        }

        fn mark_deleted(&mut self) {
            self.deleted = true;
        }
    }

    /// Soft-deletable record whose flag has no serde default
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub(crate) struct Ticket {
        pub(crate) id: u64,
        pub(crate) subject: String,
        pub(crate) deleted: bool,
    }

    impl Resource for Ticket {
        type Id = u64;
        const NAME: &'static str = "Ticket";
        const FIELDS: &'static [&'static str] = &["id", "subject", "deleted"];

        fn id(&self) -> u64 {
            self.id
        }
    }

    impl SoftDeletable for Ticket {
        fn is_deleted(&self) -> bool {
            self.deleted
        }

        fn mark_deleted(&mut self) {
            self.deleted = true;
        }
    }

    pub(crate) fn note(id: u64, title: &str, rank: i64, author: &str) -> Note {
        Note {
            id,
            title: title.to_string(),
            rank,
            author: Author {
                name: author.to_string(),
            },
            deleted: false,
        }
    }

    /// Six notes with ids 1..=6, ranks descending, two authors
    pub(crate) fn store() -> MemoryStore<Note> {
        MemoryStore::with_records(vec![
            note(1, "alpha", 60, "ada"),
            note(2, "beta", 50, "grace"),
            note(3, "gamma", 40, "ada"),
            note(4, "delta", 30, "grace"),
            note(5, "epsilon", 20, "ada"),
            note(6, "zeta", 10, "grace"),
        ])
    }
}
