//! Error types and HTTP response conversion

use std::num::ParseIntError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::handlers::ApiError;
use crate::repository::RepositoryError;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate
///
/// Large error variants are boxed to reduce stack size
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// A numeric request parameter did not parse
    #[error("Invalid integer for parameter '{name}': {source}")]
    InvalidInteger {
        /// Parameter name, e.g. `_limit`
        name: String,
        /// Underlying parse failure
        source: ParseIntError,
    },

    /// Client-facing endpoint error
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Structured repository error with operation context
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid integer error for a named parameter
    pub fn invalid_integer(name: impl Into<String>, source: ParseIntError) -> Self {
        Error::InvalidInteger {
            name: name.into(),
            source,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Optional error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// HTTP status code
    pub status: u16,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            status: status.as_u16(),
        }
    }

    /// Create error response with a code
    pub fn with_code(
        status: StatusCode,
        code: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
            status: status.as_u16(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            Error::Api(e) => return e.into_response(),
            Error::Repository(e) => return ApiError::from(e).into_response(),

            Error::InvalidInteger { name, source } => {
                let message = format!("Invalid integer for parameter '{name}': {source}");
                tracing::debug!(parameter = %name, "rejected request parameter: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_code(StatusCode::BAD_REQUEST, "INVALID_PARAMETER", message),
                )
            }

            Error::Config(e) => {
                tracing::error!("Configuration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_code(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "CONFIG_ERROR",
                        "Service is misconfigured",
                    ),
                )
            }

            Error::Serialization(e) => {
                tracing::error!("Serialization error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_code(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "SERIALIZATION_ERROR",
                        "Failed to encode response",
                    ),
                )
            }

            Error::Io(e) => {
                tracing::error!("I/O error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "I/O error"),
                )
            }

            Error::Other(msg) => {
                tracing::error!("Unhandled error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal error occurred",
                    ),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryOperation;

    #[test]
    fn test_invalid_integer_display_names_parameter() {
        let source = "abc".parse::<u64>().unwrap_err();
        let error = Error::invalid_integer("_limit", source);
        assert!(error.to_string().contains("'_limit'"));
    }

    #[test]
    fn test_invalid_integer_is_bad_request() {
        let source = "x".parse::<u64>().unwrap_err();
        let response = Error::invalid_integer("_offset", source).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_repository_error_maps_through_api_error() {
        let error: Error =
            RepositoryError::invalid_field(RepositoryOperation::OrderBy, "Book", "isbn").into();
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);

        let error: Error =
            RepositoryError::not_found(RepositoryOperation::Get, "Book", "1").into();
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_other_is_internal() {
        let response = Error::Other("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let source = "-".parse::<u64>().unwrap_err();
        let response = Error::invalid_integer("_limit", source).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.status, 400);
        assert_eq!(body.code.as_deref(), Some("INVALID_PARAMETER"));
    }
}
