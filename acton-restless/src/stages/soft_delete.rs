//! Hide soft-deleted records from list queries

use std::fmt;
use std::marker::PhantomData;

use crate::error::Result;
use crate::params::RequestParams;
use crate::repository::{FilterCondition, QuerySet, SoftDeletable};

use super::QueryStage;

/// Stage restricting a query to records whose deleted flag is false
///
/// Runs while the query is being built, so the restriction is reflected in
/// `total` and `count` of the paginated envelope.
pub struct SoftDeleteFilter<R> {
    _resource: PhantomData<fn() -> R>,
}

impl<R> SoftDeleteFilter<R> {
    /// Create the stage for resource `R`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _resource: PhantomData,
        }
    }
}

impl<R> Default for SoftDeleteFilter<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for SoftDeleteFilter<R> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for SoftDeleteFilter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftDeleteFilter").finish()
    }
}

impl<R, Q> QueryStage<Q> for SoftDeleteFilter<R>
where
    R: SoftDeletable,
    Q: QuerySet<Record = R>,
{
    fn name(&self) -> &'static str {
        "soft_delete"
    }

    fn apply(&self, query: Q, _params: &RequestParams) -> Result<Q> {
        Ok(query.filter(&[FilterCondition::eq(R::DELETED_FIELD, false)])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RecordStore;
    use crate::stages::fixtures::{store, Note};

    #[tokio::test]
    async fn test_deleted_records_are_not_listed() {
        let store = store();
        for id in [2, 5] {
            let mut note = store.get(&id).await.unwrap().unwrap();
            note.mark_deleted();
            store.save(note).await.unwrap();
        }

        let query = SoftDeleteFilter::<Note>::new()
            .apply(store.query(), &RequestParams::new())
            .unwrap();

        assert_eq!(query.count().await.unwrap(), 4);
        let notes = query.fetch().await.unwrap();
        assert!(notes.iter().all(|n| !n.is_deleted()));
        assert_eq!(
            notes.iter().map(|n| n.id).collect::<Vec<_>>(),
            vec![1, 3, 4, 6]
        );
    }
}
