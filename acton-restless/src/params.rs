//! Request parameters for list operations
//!
//! A flat string-to-string mapping built from the query string. Keys starting
//! with `_` are reserved for endpoint options; every other key is a filter
//! field path.
//!
//! # Example
//!
//! ```rust
//! use acton_restless::params::RequestParams;
//!
//! let params = RequestParams::from_iter([("_limit", "5"), ("title", "Dune")]);
//!
//! assert_eq!(params.integer("_limit", 20).unwrap(), 5);
//! assert_eq!(params.integer("_offset", 0).unwrap(), 0);
//! assert_eq!(params.filter_params().count(), 1);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Page size parameter
pub const LIMIT_PARAM: &str = "_limit";

/// Window start parameter
pub const OFFSET_PARAM: &str = "_offset";

/// Ordering parameter, a field name with an optional leading `-`
pub const ORDER_BY_PARAM: &str = "_orderby";

/// Prefix marking a key as an endpoint option rather than a filter
pub const RESERVED_PREFIX: char = '_';

/// String-to-string request parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestParams(BTreeMap<String, String>);

impl RequestParams {
    /// Create an empty parameter set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a parameter
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace a parameter in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw value of a parameter
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Parse a parameter as an unsigned integer
    ///
    /// An absent or empty value yields `default`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInteger`] when the value is present but is not
    /// a non-negative integer.
    pub fn integer(&self, key: &str, default: u64) -> Result<u64> {
        match self.get(key).map(str::trim) {
            None | Some("") => Ok(default),
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|source| Error::invalid_integer(key, source)),
        }
    }

    /// Parameters naming filter field paths, reserved keys excluded
    pub fn filter_params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter(|(key, _)| !key.starts_with(RESERVED_PREFIX))
    }

    /// Every parameter in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no parameters
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for RequestParams {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}
