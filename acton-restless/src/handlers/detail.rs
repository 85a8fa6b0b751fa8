//! Item endpoint: GET, PUT, PATCH and DELETE on a single record

use std::fmt;
use std::marker::PhantomData;

use serde_json::{Map, Value};

use crate::error::Result;
use crate::repository::{Payload, RecordStore, Resource, SoftDeletable};

use super::delete::{DeleteStrategy, HardDelete, SoftDelete};
use super::error::{ApiError, ApiOperation};
use super::fields::FieldPolicy;

/// Detail endpoint over a record store
///
/// `D` decides how records are deleted; see [`HardDelete`] and [`SoftDelete`].
pub struct DetailEndpoint<R: Resource, S: RecordStore<R>, D: DeleteStrategy<R> = HardDelete> {
    store: S,
    strategy: D,
    fields: FieldPolicy,
    _resource: PhantomData<fn() -> R>,
}

impl<R, S, D> fmt::Debug for DetailEndpoint<R, S, D>
where
    R: Resource,
    S: RecordStore<R>,
    D: DeleteStrategy<R>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetailEndpoint")
            .field("resource", &R::NAME)
            .field("delete", &D::NAME)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl<R: Resource, S: RecordStore<R>> DetailEndpoint<R, S, HardDelete> {
    /// Start building an endpoint over `store`; deletes are hard by default
    pub fn builder(store: S) -> DetailEndpointBuilder<R, S, HardDelete> {
        DetailEndpointBuilder {
            store,
            strategy: HardDelete,
            _resource: PhantomData,
        }
    }
}

impl<R, S, D> DetailEndpoint<R, S, D>
where
    R: Resource,
    S: RecordStore<R>,
    D: DeleteStrategy<R>,
{
    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Field restrictions applied by this endpoint
    pub fn field_policy(&self) -> &FieldPolicy {
        &self.fields
    }

    /// Read one record
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` [`ApiError`] when no record has this identifier.
    pub async fn get(&self, id: &R::Id) -> Result<Value> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found(ApiOperation::Get, R::NAME, id.to_string()))?;
        Ok(self.fields.render(&record)?)
    }

    /// Create the record at `id` or replace it entirely
    ///
    /// Protected fields keep the value stored on the existing record, so a
    /// replace cannot undo a soft delete by omission. A new record starts
    /// with the policy's initial values.
    ///
    /// # Errors
    ///
    /// Rejects payloads that set a protected field before the store is
    /// touched, whether or not the record exists.
    pub async fn put(&self, id: &R::Id, payload: Payload) -> Result<Value> {
        self.fields
            .reject_protected_fields(ApiOperation::Replace, &payload)?;

        let mut payload = payload;
        match self.store.get(id).await? {
            Some(existing) => payload.extend(self.protected_values(&existing)?),
            None => self.fields.fill_initial_values(&mut payload),
        }

        let record = self.store.replace(id, payload).await?;
        tracing::info!(resource = R::NAME, %id, "record replaced");
        Ok(self.fields.render(&record)?)
    }

    /// Merge a partial payload into the record at `id`
    ///
    /// # Errors
    ///
    /// Rejects payloads that set a protected field; returns `NotFound` when
    /// the record does not exist.
    pub async fn patch(&self, id: &R::Id, payload: Payload) -> Result<Value> {
        self.fields
            .reject_protected_fields(ApiOperation::Update, &payload)?;
        let record = self.store.merge(id, payload).await?;
        tracing::info!(resource = R::NAME, %id, "record updated");
        Ok(self.fields.render(&record)?)
    }

    /// Delete the record at `id` with the endpoint's strategy
    ///
    /// Answers with an empty JSON object.
    pub async fn delete(&self, id: &R::Id) -> Result<Value> {
        self.strategy.delete(&self.store, id).await?;
        Ok(Value::Object(Map::new()))
    }

    fn protected_values(&self, record: &R) -> Result<Payload> {
        let Value::Object(mut stored) = serde_json::to_value(record)? else {
            return Ok(Payload::new());
        };
        Ok(self
            .fields
            .protected()
            .iter()
            .filter_map(|field| stored.remove_entry(*field))
            .collect())
    }
}

/// Builder for [`DetailEndpoint`]
pub struct DetailEndpointBuilder<R, S, D> {
    store: S,
    strategy: D,
    _resource: PhantomData<fn() -> R>,
}

impl<R, S, D> DetailEndpointBuilder<R, S, D>
where
    R: Resource,
    S: RecordStore<R>,
    D: DeleteStrategy<R>,
{
    /// Build the endpoint
    pub fn build(self) -> DetailEndpoint<R, S, D> {
        let fields = self.strategy.field_policy();
        tracing::debug!(
            resource = R::NAME,
            delete = D::NAME,
            protected = ?fields.protected(),
            "detail endpoint configured"
        );
        DetailEndpoint {
            store: self.store,
            strategy: self.strategy,
            fields,
            _resource: PhantomData,
        }
    }
}

impl<R: SoftDeletable, S: RecordStore<R>> DetailEndpointBuilder<R, S, HardDelete> {
    /// Mark records deleted instead of removing them
    ///
    /// Also protects the deleted flag from client writes and hides it from
    /// output.
    pub fn soft_delete(self) -> DetailEndpointBuilder<R, S, SoftDelete> {
        DetailEndpointBuilder {
            store: self.store,
            strategy: SoftDelete,
            _resource: PhantomData,
        }
    }
}
