//! API error types for endpoint operations
//!
//! Client-facing errors returned as values by endpoint verbs, with HTTP status
//! code mapping via `IntoResponse`.
//!
//! # Example
//!
//! ```rust
//! use acton_restless::handlers::{ApiError, ApiErrorKind, ApiOperation};
//!
//! let error = ApiError::protected_field(ApiOperation::Update, "deleted");
//! assert!(matches!(error.kind, ApiErrorKind::BadRequest));
//! assert_eq!(error.field.as_deref(), Some("deleted"));
//! ```

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};

/// Endpoint verb being served when the API error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// Listing records (GET on a collection)
    List,
    /// Reading a single record (GET on an item)
    Get,
    /// Creating a record (POST)
    Create,
    /// Creating or replacing a record (PUT)
    Replace,
    /// Partially updating a record (PATCH)
    Update,
    /// Deleting a record (DELETE)
    Delete,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Get => write!(f, "get"),
            Self::Create => write!(f, "create"),
            Self::Replace => write!(f, "replace"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Category of API error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Record was not found
    NotFound,
    /// Record already exists
    AlreadyExists,
    /// Payload could not be turned into a record
    ValidationFailed,
    /// Invalid request parameters or payload fields
    BadRequest,
    /// Internal server error
    InternalError,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::BadRequest => write!(f, "bad_request"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

impl ApiErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error kind
    #[must_use]
    pub fn error_code(&self) -> String {
        self.to_string().to_uppercase()
    }

    /// Whether the error is the client's fault (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured API error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The verb being served when the error occurred
    pub operation: ApiOperation,
    /// The category of error
    pub kind: ApiErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The resource involved (e.g., "Book")
    pub entity_type: Option<String>,
    /// The identifier of the record involved
    pub entity_id: Option<String>,
    /// The request field the error is about
    pub field: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(operation: ApiOperation, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
            field: None,
        }
    }

    /// Create a "not found" error with record context
    ///
    /// ```rust
    /// use acton_restless::handlers::{ApiError, ApiOperation};
    ///
    /// let error = ApiError::not_found(ApiOperation::Get, "Book", "7");
    /// assert_eq!(error.entity_type.as_deref(), Some("Book"));
    /// ```
    pub fn not_found(
        operation: ApiOperation,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        Self::new(operation, ApiErrorKind::NotFound, "Entity not found")
            .with_entity(entity_type, entity_id)
    }

    /// Create a bad request error
    pub fn bad_request(operation: ApiOperation, message: impl Into<String>) -> Self {
        Self::new(operation, ApiErrorKind::BadRequest, message)
    }

    /// Create the error returned when a payload tries to write a protected field
    pub fn protected_field(operation: ApiOperation, field: impl Into<String>) -> Self {
        let field = field.into();
        Self::bad_request(
            operation,
            format!("Field '{field}' cannot be set by clients"),
        )
        .with_field(field)
    }

    /// Add record context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Name the request field the error is about
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{entity_type}: {entity_id}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Response body for API errors
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub(crate) error: String,
    pub(crate) code: String,
    pub(crate) status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        if self.kind.is_client_error() {
            tracing::debug!(
                operation = %self.operation,
                kind = %self.kind,
                entity_type = ?self.entity_type,
                entity_id = ?self.entity_id,
                field = ?self.field,
                "API client error: {}", self.message
            );
        } else {
            tracing::error!(
                operation = %self.operation,
                kind = %self.kind,
                entity_type = ?self.entity_type,
                entity_id = ?self.entity_id,
                "API error: {}", self.message
            );
        }

        let response = ApiErrorResponse {
            error: self.message,
            code: self.kind.error_code(),
            status: status.as_u16(),
            operation: Some(self.operation.to_string()),
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            field: self.field,
        };

        (status, Json(response)).into_response()
    }
}

/// Convert RepositoryOperation to ApiOperation
fn repository_operation_to_api_operation(op: RepositoryOperation) -> ApiOperation {
    match op {
        RepositoryOperation::Count
        | RepositoryOperation::Fetch
        | RepositoryOperation::Filter
        | RepositoryOperation::OrderBy => ApiOperation::List,
        RepositoryOperation::Get => ApiOperation::Get,
        RepositoryOperation::Create => ApiOperation::Create,
        RepositoryOperation::Replace => ApiOperation::Replace,
        RepositoryOperation::Merge => ApiOperation::Update,
        RepositoryOperation::Save | RepositoryOperation::Remove => ApiOperation::Delete,
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        let operation = repository_operation_to_api_operation(err.operation);

        let kind = match err.kind {
            RepositoryErrorKind::NotFound => ApiErrorKind::NotFound,
            RepositoryErrorKind::AlreadyExists => ApiErrorKind::AlreadyExists,
            RepositoryErrorKind::InvalidField => ApiErrorKind::BadRequest,
            RepositoryErrorKind::ValidationFailed => ApiErrorKind::ValidationFailed,
            RepositoryErrorKind::SerializationError | RepositoryErrorKind::Other => {
                ApiErrorKind::InternalError
            }
        };

        // Backend details stay in the logs for internal errors
        let message = match kind {
            ApiErrorKind::InternalError => {
                tracing::error!(error = %err, "repository failure");
                "An internal error occurred".to_string()
            }
            _ => err.message,
        };

        Self {
            operation,
            kind,
            message,
            entity_type: err.entity_type,
            entity_id: err.entity_id,
            field: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiErrorKind::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiErrorKind::AlreadyExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiErrorKind::ValidationFailed.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiErrorKind::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiErrorKind::InternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_code_is_uppercase_kind() {
        assert_eq!(ApiErrorKind::BadRequest.error_code(), "BAD_REQUEST");
        assert_eq!(ApiErrorKind::NotFound.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_protected_field_names_field() {
        let error = ApiError::protected_field(ApiOperation::Create, "deleted");
        assert_eq!(error.kind, ApiErrorKind::BadRequest);
        assert_eq!(error.operation, ApiOperation::Create);
        assert_eq!(error.field.as_deref(), Some("deleted"));
        assert!(error.message.contains("'deleted'"));
    }

    #[test]
    fn test_invalid_field_becomes_bad_request_with_message() {
        let repo = RepositoryError::invalid_field(RepositoryOperation::OrderBy, "Book", "isbn");
        let message = repo.message.clone();
        let api: ApiError = repo.into();
        assert_eq!(api.kind, ApiErrorKind::BadRequest);
        assert_eq!(api.operation, ApiOperation::List);
        assert_eq!(api.message, message);
    }

    #[test]
    fn test_not_found_conversion_keeps_entity() {
        let repo = RepositoryError::not_found(RepositoryOperation::Merge, "Book", "3");
        let api: ApiError = repo.into();
        assert_eq!(api.kind, ApiErrorKind::NotFound);
        assert_eq!(api.operation, ApiOperation::Update);
        assert_eq!(api.entity_id.as_deref(), Some("3"));
    }

    #[test]
    fn test_internal_conversion_hides_details() {
        let repo = RepositoryError::serialization_error(RepositoryOperation::Fetch, "secret");
        let api: ApiError = repo.into();
        assert_eq!(api.kind, ApiErrorKind::InternalError);
        assert!(!api.message.contains("secret"));
    }

    #[test]
    fn test_display_with_entity() {
        let display = ApiError::not_found(ApiOperation::Get, "Book", "9").to_string();
        assert!(display.contains("not_found"));
        assert!(display.contains("[Book: 9]"));
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = ApiError::protected_field(ApiOperation::Update, "deleted").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let body: ApiErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.code, "BAD_REQUEST");
        assert_eq!(body.status, 400);
        assert_eq!(body.field.as_deref(), Some("deleted"));
        assert_eq!(body.operation.as_deref(), Some("update"));
    }
}
