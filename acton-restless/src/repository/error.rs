//! Repository error types
//!
//! Errors raised by query and persistence backends. They carry the operation
//! that failed and a coarse kind, which the handler layer maps onto HTTP
//! status codes.
//!
//! # Example
//!
//! ```rust
//! use acton_restless::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
//!
//! let error = RepositoryError::invalid_field(RepositoryOperation::OrderBy, "Book", "isbn");
//! assert!(matches!(error.kind, RepositoryErrorKind::InvalidField));
//! assert_eq!(error.entity_type.as_deref(), Some("Book"));
//! ```

use std::fmt;

/// Operation being performed when the repository error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Counting the records a query matches
    Count,
    /// Evaluating a query into records
    Fetch,
    /// Adding inclusion or exclusion conditions
    Filter,
    /// Applying a sort directive
    OrderBy,
    /// Loading a single record by identifier
    Get,
    /// Persisting a loaded record
    Save,
    /// Creating a record from a payload
    Create,
    /// Creating or replacing a record from a full payload
    Replace,
    /// Merging a partial payload into an existing record
    Merge,
    /// Physically removing a record
    Remove,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count => write!(f, "count"),
            Self::Fetch => write!(f, "fetch"),
            Self::Filter => write!(f, "filter"),
            Self::OrderBy => write!(f, "order_by"),
            Self::Get => write!(f, "get"),
            Self::Save => write!(f, "save"),
            Self::Create => write!(f, "create"),
            Self::Replace => write!(f, "replace"),
            Self::Merge => write!(f, "merge"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Record was not found
    NotFound,
    /// Record already exists (duplicate identifier)
    AlreadyExists,
    /// Field path is not part of the resource schema
    InvalidField,
    /// Payload failed validation before reaching storage
    ValidationFailed,
    /// Record could not be converted to or from its serialized form
    SerializationError,
    /// Other unclassified error
    Other,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::InvalidField => write!(f, "invalid_field"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::SerializationError => write!(f, "serialization_error"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured repository error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The resource involved (e.g., "Book")
    pub entity_type: Option<String>,
    /// The identifier of the record involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Create a "not found" error with record context
    ///
    /// ```rust
    /// use acton_restless::repository::{RepositoryError, RepositoryOperation};
    ///
    /// let error = RepositoryError::not_found(RepositoryOperation::Merge, "Book", "7");
    /// assert_eq!(error.entity_id.as_deref(), Some("7"));
    /// ```
    pub fn not_found(
        operation: RepositoryOperation,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind: RepositoryErrorKind::NotFound,
            message: "Entity not found".to_string(),
            entity_type: Some(entity_type.into()),
            entity_id: Some(entity_id.into()),
        }
    }

    /// Create an "already exists" error with record context
    pub fn already_exists(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            operation: RepositoryOperation::Create,
            kind: RepositoryErrorKind::AlreadyExists,
            message: "Entity already exists".to_string(),
            entity_type: Some(entity_type.into()),
            entity_id: None,
        }
        .with_id(entity_id)
    }

    /// Create an "invalid field" error for a field path the schema does not know
    ///
    /// The message mirrors what a query backend reports when asked to resolve
    /// an unknown field, and is surfaced verbatim to API clients.
    pub fn invalid_field(
        operation: RepositoryOperation,
        entity_type: impl Into<String>,
        field: &str,
    ) -> Self {
        let entity_type = entity_type.into();
        Self {
            operation,
            kind: RepositoryErrorKind::InvalidField,
            message: format!("Cannot resolve keyword '{field}' into field of {entity_type}"),
            entity_type: Some(entity_type),
            entity_id: None,
        }
    }

    /// Create a validation failed error
    pub fn validation_failed(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::ValidationFailed, message)
    }

    /// Create a serialization error
    pub fn serialization_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::SerializationError, message)
    }

    /// Attach the resource name to an existing error
    #[must_use]
    pub fn with_entity(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Attach the record identifier to an existing error
    #[must_use]
    pub fn with_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        match (&self.entity_type, &self.entity_id) {
            (Some(entity_type), Some(entity_id)) => write!(f, " [{entity_type}: {entity_id}]"),
            (Some(entity_type), None) => write!(f, " [{entity_type}]"),
            _ => Ok(()),
        }
    }
}

impl std::error::Error for RepositoryError {}
