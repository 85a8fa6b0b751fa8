//! Field-level write protection and output hiding
//!
//! A [`FieldPolicy`] is the declarative list of fields clients may not write
//! and fields clients never see. Every write verb calls
//! [`FieldPolicy::reject_protected_fields`] before touching the store, and
//! every read verb passes its output through
//! [`FieldPolicy::strip_hidden_fields`]. Since clients cannot supply a
//! protected field, the policy also carries the value it starts with on new
//! records.
//!
//! # Example
//!
//! ```rust
//! use acton_restless::handlers::{ApiOperation, FieldPolicy};
//! use serde_json::json;
//!
//! let policy = FieldPolicy::new()
//!     .protect("deleted")
//!     .hide("deleted")
//!     .initial("deleted", json!(false));
//!
//! let payload = json!({"title": "Dune", "deleted": true});
//! let err = policy
//!     .reject_protected_fields(ApiOperation::Create, payload.as_object().unwrap())
//!     .unwrap_err();
//! assert_eq!(err.field.as_deref(), Some("deleted"));
//!
//! let mut output = json!([{"id": 1, "deleted": false}, {"id": 2}]);
//! policy.strip_hidden_fields(&mut output);
//! assert_eq!(output, json!([{"id": 1}, {"id": 2}]));
//!
//! let mut created = json!({"title": "Dune"}).as_object().unwrap().clone();
//! policy.fill_initial_values(&mut created);
//! assert_eq!(created["deleted"], false);
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::repository::Payload;

use super::error::{ApiError, ApiOperation};

/// Protected and hidden field lists for one resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPolicy {
    protected: Vec<&'static str>,
    hidden: Vec<&'static str>,
    initial: Vec<(&'static str, Value)>,
}

impl FieldPolicy {
    /// Policy with no restrictions
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject `field` in client payloads
    #[must_use]
    pub fn protect(mut self, field: &'static str) -> Self {
        if !self.protected.contains(&field) {
            self.protected.push(field);
        }
        self
    }

    /// Remove `field` from every serialized record
    #[must_use]
    pub fn hide(mut self, field: &'static str) -> Self {
        if !self.hidden.contains(&field) {
            self.hidden.push(field);
        }
        self
    }

    /// Write `value` into `field` of every created or replaced record that
    /// lacks it
    #[must_use]
    pub fn initial(mut self, field: &'static str, value: Value) -> Self {
        match self.initial.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.initial.push((field, value)),
        }
        self
    }

    /// Fields clients may not write
    pub fn protected(&self) -> &[&'static str] {
        &self.protected
    }

    /// Fields clients never see
    pub fn hidden(&self) -> &[&'static str] {
        &self.hidden
    }

    /// Fail if `payload` sets any protected field
    ///
    /// # Errors
    ///
    /// Returns a `BadRequest` [`ApiError`] naming the first protected field
    /// found in the payload.
    pub fn reject_protected_fields(
        &self,
        operation: ApiOperation,
        payload: &Payload,
    ) -> Result<(), ApiError> {
        match self
            .protected
            .iter()
            .find(|field| payload.contains_key(**field))
        {
            Some(field) => {
                tracing::debug!(%operation, field, "rejected write to protected field");
                Err(ApiError::protected_field(operation, *field))
            }
            None => Ok(()),
        }
    }

    /// Insert the initial value of every field the payload does not set
    pub fn fill_initial_values(&self, payload: &mut Payload) {
        for (field, value) in &self.initial {
            payload
                .entry(*field)
                .or_insert_with(|| value.clone());
        }
    }

    /// Serialize a record for output, hidden fields removed
    pub fn render<T: Serialize + ?Sized>(&self, record: &T) -> serde_json::Result<Value> {
        let mut value = serde_json::to_value(record)?;
        self.strip_hidden_fields(&mut value);
        Ok(value)
    }

    /// Remove hidden keys from a record or a sequence of records
    ///
    /// Values that are neither objects nor arrays of objects are left as they
    /// are, as are records that lack the key.
    pub fn strip_hidden_fields(&self, value: &mut Value) {
        if self.hidden.is_empty() {
            return;
        }
        match value {
            Value::Object(record) => {
                for field in &self.hidden {
                    record.remove(*field);
                }
            }
            Value::Array(records) => {
                for record in records {
                    self.strip_hidden_fields(record);
                }
            }
            _ => {}
        }
    }
}
