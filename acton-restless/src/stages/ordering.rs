//! `_orderby` handling

use crate::error::{Error, Result};
use crate::handlers::{ApiError, ApiOperation};
use crate::params::{RequestParams, ORDER_BY_PARAM};
use crate::repository::{OrderBy, QuerySet, RepositoryErrorKind};

use super::QueryStage;

/// Stage sorting a query by the `_orderby` parameter
///
/// A leading `-` sorts descending. A field outside the resource schema is a
/// client error carrying the backend's message.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ordering;

impl<Q: QuerySet> QueryStage<Q> for Ordering {
    fn name(&self) -> &'static str {
        "ordering"
    }

    fn apply(&self, query: Q, params: &RequestParams) -> Result<Q> {
        let Some(raw) = params.get(ORDER_BY_PARAM).filter(|raw| !raw.is_empty()) else {
            return Ok(query);
        };

        let order = OrderBy::parse(raw);
        query.order_by(&order).map_err(|err| match err.kind {
            RepositoryErrorKind::InvalidField => {
                tracing::debug!(order_by = raw, "rejected ordering field");
                Error::Api(ApiError::bad_request(ApiOperation::List, err.message))
            }
            _ => Error::Repository(err),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ApiErrorKind;
    use crate::repository::RecordStore;
    use crate::stages::fixtures::store;

    async fn ordered(value: &str) -> Vec<u64> {
        let params = RequestParams::new().with(ORDER_BY_PARAM, value);
        let query = Ordering.apply(store().query(), &params).unwrap();
        query.fetch().await.unwrap().iter().map(|n| n.id).collect()
    }

    #[tokio::test]
    async fn test_ascending_and_descending() {
        assert_eq!(ordered("rank").await, vec![6, 5, 4, 3, 2, 1]);
        assert_eq!(ordered("-id").await, vec![6, 5, 4, 3, 2, 1]);
        assert_eq!(ordered("id").await, vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn test_related_field_ordering() {
        assert_eq!(ordered("author__name").await, vec![1, 3, 5, 2, 4, 6]);
    }

    #[tokio::test]
    async fn test_absent_parameter_leaves_query_alone() {
        let query = Ordering.apply(store().query(), &RequestParams::new()).unwrap();
        let ids: Vec<u64> = query.fetch().await.unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_invalid_field_is_bad_request() {
        for field in ["invalid_field", "-invalid_field", "title__nonsense", "id__x", "author__age"] {
            let params = RequestParams::new().with(ORDER_BY_PARAM, field);
            match Ordering.apply(store().query(), &params) {
                Err(Error::Api(api)) => {
                    assert_eq!(api.kind, ApiErrorKind::BadRequest, "field {field}");
                    assert!(api.message.contains(field.trim_start_matches('-')));
                }
                Err(other) => panic!("unexpected error for {field}: {other:?}"),
                Ok(_) => panic!("ordering by {field} succeeded"),
            }
        }
    }
}
