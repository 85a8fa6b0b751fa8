//! Delete strategies for detail endpoints
//!
//! [`HardDelete`] removes the record from the store. [`SoftDelete`] sets the
//! resource's deleted flag instead, and is only available for
//! [`SoftDeletable`] resources. The strategy also decides which fields the
//! endpoint protects and hides.

use std::future::Future;

use serde_json::Value;

use crate::error::Result;
use crate::repository::{RecordStore, Resource, SoftDeletable};

use super::error::{ApiError, ApiOperation};
use super::fields::FieldPolicy;

/// How a detail endpoint deletes records
pub trait DeleteStrategy<R: Resource>: Send + Sync + 'static {
    /// Name used in logs
    const NAME: &'static str;

    /// Field restrictions the strategy requires
    fn field_policy(&self) -> FieldPolicy {
        FieldPolicy::new()
    }

    /// Delete the record at `id`
    fn delete<S: RecordStore<R>>(
        &self,
        store: &S,
        id: &R::Id,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Physically remove records; deleting a missing record is a 404
#[derive(Debug, Clone, Copy, Default)]
pub struct HardDelete;

impl<R: Resource> DeleteStrategy<R> for HardDelete {
    const NAME: &'static str = "hard";

    async fn delete<S: RecordStore<R>>(&self, store: &S, id: &R::Id) -> Result<()> {
        if store.remove(id).await? {
            tracing::info!(resource = R::NAME, %id, "record removed");
            Ok(())
        } else {
            Err(ApiError::not_found(ApiOperation::Delete, R::NAME, id.to_string()).into())
        }
    }
}

/// Mark records deleted instead of removing them
///
/// Idempotent: a missing or already deleted record is left alone and the
/// call still succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftDelete;

impl<R: SoftDeletable> DeleteStrategy<R> for SoftDelete {
    const NAME: &'static str = "soft";

    fn field_policy(&self) -> FieldPolicy {
        FieldPolicy::new()
            .protect(R::DELETED_FIELD)
            .hide(R::DELETED_FIELD)
            .initial(R::DELETED_FIELD, Value::Bool(false))
    }

    async fn delete<S: RecordStore<R>>(&self, store: &S, id: &R::Id) -> Result<()> {
        match store.get(id).await? {
            Some(mut record) if !record.is_deleted() => {
                record.mark_deleted();
                store.save(record).await?;
                tracing::info!(resource = R::NAME, %id, "record soft-deleted");
            }
            Some(_) => {
                tracing::debug!(resource = R::NAME, %id, "record already deleted");
            }
            None => {
                tracing::debug!(resource = R::NAME, %id, "no record to delete");
            }
        }
        Ok(())
    }
}
