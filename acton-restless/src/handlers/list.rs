//! Collection endpoint: paginated GET and POST
//!
//! # Example
//!
//! ```rust
//! use acton_restless::handlers::ListEndpoint;
//! use acton_restless::params::RequestParams;
//! use acton_restless::repository::{MemoryStore, Resource, SoftDeletable};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Task {
//!     id: u32,
//!     done: bool,
//!     #[serde(default)]
//!     deleted: bool,
//! }
//!
//! impl Resource for Task {
//!     type Id = u32;
//!     const NAME: &'static str = "Task";
//!     const FIELDS: &'static [&'static str] = &["id", "done", "deleted"];
//!
//!     fn id(&self) -> u32 {
//!         self.id
//!     }
//! }
//!
//! impl SoftDeletable for Task {
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
//! let store = MemoryStore::with_records(vec![
//!     Task { id: 1, done: true, deleted: false },
//!     Task { id: 2, done: false, deleted: true },
//!     Task { id: 3, done: false, deleted: false },
//! ]);
//!
//! let endpoint = ListEndpoint::builder(store)
//!     .soft_delete()
//!     .filtering()
//!     .ordering()
//!     .page_size(10)
//!     .build();
//!
//! let envelope = endpoint
//!     .get(&RequestParams::from_iter([("_orderby", "-id")]))
//!     .await
//!     .unwrap();
//! assert_eq!(envelope.total, 2);
//! assert_eq!(envelope.results[0]["id"], 3);
//! assert!(envelope.results[0].get("deleted").is_none());
//! # });
//! ```

use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;

use crate::error::Result;
use crate::pagination::{Paginator, ResultEnvelope};
use crate::params::RequestParams;
use crate::repository::{Payload, RecordStore, Resource, SoftDeletable};
use crate::stages::{Ordering, Pipeline, QueryFilter, QueryStage, SoftDeleteFilter};

use super::delete::{DeleteStrategy, SoftDelete};
use super::error::ApiOperation;
use super::fields::FieldPolicy;

/// List endpoint over a record store
pub struct ListEndpoint<R: Resource, S: RecordStore<R>> {
    store: S,
    pipeline: Pipeline<S::Query>,
    paginator: Paginator,
    fields: FieldPolicy,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource, S: RecordStore<R>> fmt::Debug for ListEndpoint<R, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListEndpoint")
            .field("resource", &R::NAME)
            .field("stages", &self.pipeline.stage_names())
            .field("paginator", &self.paginator)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl<R: Resource, S: RecordStore<R>> ListEndpoint<R, S> {
    /// Start building an endpoint over `store`
    pub fn builder(store: S) -> ListEndpointBuilder<R, S> {
        ListEndpointBuilder {
            store,
            pipeline: Pipeline::new(),
            paginator: Paginator::default(),
            fields: FieldPolicy::new(),
            _resource: PhantomData,
        }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Field restrictions applied by this endpoint
    pub fn field_policy(&self) -> &FieldPolicy {
        &self.fields
    }

    /// Base query passed through every registered stage, not yet windowed
    ///
    /// # Errors
    ///
    /// Returns the first stage failure, e.g. a bad `_orderby` field.
    pub fn query_set(&self, params: &RequestParams) -> Result<S::Query> {
        self.pipeline.run(self.store.query(), params)
    }

    /// List records as a paginated envelope
    ///
    /// # Errors
    ///
    /// Fails on invalid `_limit` / `_offset` values, on stage failures, and
    /// on backend errors.
    pub async fn get(&self, params: &RequestParams) -> Result<ResultEnvelope> {
        let query = self.query_set(params)?;
        let mut envelope = self.paginator.paginate(query, params).await?.envelope()?;
        for record in &mut envelope.results {
            self.fields.strip_hidden_fields(record);
        }
        Ok(envelope)
    }

    /// Create a record from a client payload
    ///
    /// Protected fields start at the policy's initial values.
    ///
    /// # Errors
    ///
    /// Rejects payloads that set a protected field before the store is
    /// touched; otherwise returns backend errors such as duplicates.
    pub async fn post(&self, mut payload: Payload) -> Result<Value> {
        self.fields
            .reject_protected_fields(ApiOperation::Create, &payload)?;
        self.fields.fill_initial_values(&mut payload);
        let record = self.store.create(payload).await?;
        tracing::info!(resource = R::NAME, id = %record.id(), "record created");
        Ok(self.fields.render(&record)?)
    }
}

/// Builder for [`ListEndpoint`]
///
/// Stages run in the order their builder methods are called.
pub struct ListEndpointBuilder<R: Resource, S: RecordStore<R>> {
    store: S,
    pipeline: Pipeline<S::Query>,
    paginator: Paginator,
    fields: FieldPolicy,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource, S: RecordStore<R>> ListEndpointBuilder<R, S> {
    /// Records per page when `_limit` is absent
    #[must_use]
    pub fn page_size(self, page_size: u64) -> Self {
        self.paginator(Paginator::new(page_size))
    }

    /// Paginate with `paginator`, e.g. one built from configuration
    #[must_use]
    pub fn paginator(mut self, paginator: Paginator) -> Self {
        self.paginator = paginator;
        self
    }

    /// Accept `field=value`, `field__in=` and `field__not_in=` parameters
    #[must_use]
    pub fn filtering(self) -> Self {
        self.stage(QueryFilter)
    }

    /// Accept the `_orderby` parameter
    #[must_use]
    pub fn ordering(self) -> Self {
        self.stage(Ordering)
    }

    /// Append a custom stage
    #[must_use]
    pub fn stage(mut self, stage: impl QueryStage<S::Query> + 'static) -> Self {
        self.pipeline.push(stage);
        self
    }

    /// Build the endpoint
    pub fn build(self) -> ListEndpoint<R, S> {
        tracing::debug!(
            resource = R::NAME,
            stages = ?self.pipeline.stage_names(),
            page_size = self.paginator.default_limit(),
            "list endpoint configured"
        );
        ListEndpoint {
            store: self.store,
            pipeline: self.pipeline,
            paginator: self.paginator,
            fields: self.fields,
            _resource: PhantomData,
        }
    }
}

impl<R: SoftDeletable, S: RecordStore<R>> ListEndpointBuilder<R, S> {
    /// Hide deleted records and the deleted flag, and refuse client writes to it
    ///
    /// Uses the same field policy as a [`SoftDelete`] detail endpoint.
    #[must_use]
    pub fn soft_delete(mut self) -> Self {
        self.fields = DeleteStrategy::<R>::field_policy(&SoftDelete);
        self.stage(SoftDeleteFilter::<R>::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::handlers::ApiErrorKind;
    use crate::config::Config;
    use crate::repository::{MemoryStore, QuerySet, RepositoryErrorKind};
    use crate::stages::fixtures::{store, Note, Ticket};
    use serde_json::json;

    type Endpoint = ListEndpoint<Note, MemoryStore<Note>>;

    fn full(store: MemoryStore<Note>) -> Endpoint {
        ListEndpoint::builder(store)
            .soft_delete()
            .filtering()
            .ordering()
            .build()
    }

    fn ids(envelope: &ResultEnvelope) -> Vec<u64> {
        envelope
            .results
            .iter()
            .filter_map(|r| r["id"].as_u64())
            .collect()
    }

    fn object(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    async fn delete_notes(store: &MemoryStore<Note>, ids: &[u64]) {
        for id in ids {
            let mut record = store.get(id).await.unwrap().unwrap();
            record.mark_deleted();
            store.save(record).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_paginated_listing() {
        let endpoint = ListEndpoint::builder(store()).build();
        let params = RequestParams::from_iter([("_limit", "2"), ("_offset", "1")]);
        let envelope = endpoint.get(&params).await.unwrap();

        assert_eq!(envelope.total, 6);
        assert_eq!(envelope.count, 2);
        assert_eq!(ids(&envelope), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_default_page_size_applies() {
        let endpoint = ListEndpoint::builder(store()).page_size(4).build();
        let envelope = endpoint.get(&RequestParams::new()).await.unwrap();
        assert_eq!(envelope.total, 6);
        assert_eq!(envelope.count, 4);
    }

    #[tokio::test]
    async fn test_configured_paginator_sets_page_size() {
        let mut config = Config::default();
        config.pagination.default_page_size = 5;
        let endpoint = ListEndpoint::builder(store())
            .paginator(config.paginator())
            .build();
        let envelope = endpoint.get(&RequestParams::new()).await.unwrap();
        assert_eq!(envelope.total, 6);
        assert_eq!(envelope.count, 5);
    }

    #[tokio::test]
    async fn test_soft_deleted_records_are_excluded_from_counts() {
        let store = store();
        delete_notes(&store, &[1, 4]).await;

        let envelope = full(store).get(&RequestParams::new()).await.unwrap();
        assert_eq!(envelope.total, 4);
        assert_eq!(envelope.count, 4);
        assert_eq!(ids(&envelope), vec![2, 3, 5, 6]);
        assert!(envelope.results.iter().all(|r| r.get("deleted").is_none()));
    }

    #[tokio::test]
    async fn test_filter_order_and_window_compose() {
        let params = RequestParams::from_iter([
            ("author__name", "grace"),
            ("_orderby", "-rank"),
            ("_limit", "2"),
        ]);
        let envelope = full(store()).get(&params).await.unwrap();
        assert_eq!(envelope.total, 3);
        assert_eq!(ids(&envelope), vec![2, 4]);
    }

    #[tokio::test]
    async fn test_invalid_order_field_is_bad_request() {
        let params = RequestParams::from_iter([("_orderby", "invalid_field")]);
        let err = full(store()).get(&params).await.unwrap_err();
        assert!(matches!(err, Error::Api(ref api) if api.kind == ApiErrorKind::BadRequest));
    }

    #[tokio::test]
    async fn test_without_ordering_stage_orderby_is_ignored() {
        let endpoint = ListEndpoint::builder(store()).filtering().build();
        let params = RequestParams::from_iter([("_orderby", "invalid_field")]);
        assert_eq!(endpoint.get(&params).await.unwrap().total, 6);
    }

    #[tokio::test]
    async fn test_query_set_is_unwindowed() {
        let params = RequestParams::from_iter([("rank__lte", "30"), ("_limit", "1")]);
        let query = full(store()).query_set(&params).unwrap();
        assert_eq!(query.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_post_creates_and_hides_flag() {
        let store = store();
        let endpoint = full(store.clone());
        let created = endpoint
            .post(object(json!({
                "id": 7,
                "title": "eta",
                "rank": 5,
                "author": {"name": "ada"}
            })))
            .await
            .unwrap();

        assert_eq!(created["id"], 7);
        assert!(created.get("deleted").is_none());
        assert!(!store.get(&7).await.unwrap().unwrap().deleted);
    }

    #[tokio::test]
    async fn test_post_with_deleted_is_rejected_before_persistence() {
        let store = store();
        let endpoint = full(store.clone());
        let err = endpoint
            .post(object(json!({
                "id": 7,
                "title": "eta",
                "rank": 5,
                "author": {"name": "ada"},
                "deleted": false
            })))
            .await
            .unwrap_err();

        match err {
            Error::Api(api) => assert_eq!(api.field.as_deref(), Some("deleted")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.get(&7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_post_sets_flag_for_resource_without_serde_default() {
        let store = MemoryStore::<Ticket>::new();
        let endpoint = ListEndpoint::builder(store.clone()).soft_delete().build();

        let created = endpoint
            .post(object(json!({"id": 1, "subject": "printer on fire"})))
            .await
            .unwrap();
        assert_eq!(created, json!({"id": 1, "subject": "printer on fire"}));
        assert!(!store.get(&1).await.unwrap().unwrap().deleted);

        let listed = endpoint.get(&RequestParams::new()).await.unwrap();
        assert_eq!(listed.total, 1);
    }

    #[tokio::test]
    async fn test_post_duplicate_id_is_conflict() {
        let endpoint = full(store());
        let err = endpoint
            .post(object(json!({
                "id": 1,
                "title": "again",
                "rank": 0,
                "author": {"name": "ada"}
            })))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Repository(ref repo) if repo.kind == RepositoryErrorKind::AlreadyExists
        ));
    }
}
