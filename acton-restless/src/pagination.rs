//! Limit/offset pagination for list endpoints
//!
//! # Example
//!
//! ```rust
//! use acton_restless::pagination::Paginator;
//! use acton_restless::params::RequestParams;
//! use acton_restless::repository::Window;
//!
//! let paginator = Paginator::new(20);
//!
//! let params = RequestParams::from_iter([("_limit", "2"), ("_offset", "1")]);
//! assert_eq!(paginator.window(&params).unwrap(), Window::new(1, 2));
//!
//! // Absent parameters fall back to the page size and the first record
//! assert_eq!(paginator.window(&RequestParams::new()).unwrap(), Window::new(0, 20));
//! ```

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::params::{RequestParams, LIMIT_PARAM, OFFSET_PARAM};
use crate::repository::{QuerySet, Window};

/// Default number of records per page
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Paginated list body
///
/// `total` counts every record the query matches, `count` the records inside
/// the requested window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    /// Matching records before windowing
    pub total: u64,
    /// Records inside the window
    pub count: u64,
    /// The windowed records, serialized
    pub results: Vec<Value>,
}

impl IntoResponse for ResultEnvelope {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Applies `_limit` / `_offset` windows to queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    default_limit: u64,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    /// Create a paginator whose page size defaults to `default_limit`
    #[must_use]
    pub const fn new(default_limit: u64) -> Self {
        Self { default_limit }
    }

    /// Page size used when `_limit` is absent
    #[must_use]
    pub const fn default_limit(&self) -> u64 {
        self.default_limit
    }

    /// Window requested by `_limit` and `_offset`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInteger`](crate::Error::InvalidInteger) when
    /// either parameter is not a non-negative integer.
    pub fn window(&self, params: &RequestParams) -> Result<Window> {
        let limit = params.integer(LIMIT_PARAM, self.default_limit)?;
        let offset = params.integer(OFFSET_PARAM, 0)?;
        Ok(Window::new(offset, limit))
    }

    /// Count, window, and fetch `query`
    ///
    /// Records are returned as fetched; serializing them into the envelope is
    /// left to [`envelope`](Self::envelope) so callers can reshape them first.
    pub async fn paginate<Q: QuerySet>(
        &self,
        query: Q,
        params: &RequestParams,
    ) -> Result<Page<Q::Record>> {
        let window = self.window(params)?;
        let total = query.count().await?;
        let windowed = query.slice(window);
        let count = windowed.count().await?;
        let records = windowed.fetch().await?;

        tracing::debug!(
            total,
            count,
            offset = window.offset,
            limit = window.limit,
            "paginated query"
        );

        Ok(Page {
            total,
            count,
            records,
        })
    }
}

/// One fetched page, before serialization
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Matching records before windowing
    pub total: u64,
    /// Records inside the window
    pub count: u64,
    /// The windowed records
    pub records: Vec<T>,
}

impl<T: Serialize> Page<T> {
    /// Serialize the records into a result envelope
    pub fn envelope(self) -> Result<ResultEnvelope> {
        let results = self
            .records
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ResultEnvelope {
            total: self.total,
            count: self.count,
            results,
        })
    }
}
