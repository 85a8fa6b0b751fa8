//! Filtering, ordering, and windowing types for repository queries
//!
//! These types are the vocabulary endpoints use to talk to a [`QuerySet`]:
//! stages translate request parameters into [`FilterCondition`]s and an
//! [`OrderBy`], pagination translates `_limit`/`_offset` into a [`Window`].
//!
//! Field paths use `__` to separate segments (`author__name`), and the last
//! segment may name a [`Lookup`] (`price__gte`).
//!
//! # Example
//!
//! ```rust
//! use acton_restless::repository::{FilterCondition, Lookup, OrderBy, OrderDirection, Window};
//!
//! let filter = FilterCondition::from_key("price__gte", "10");
//! assert_eq!(filter.field, "price");
//! assert_eq!(filter.lookup, Lookup::Gte);
//!
//! let order = OrderBy::parse("-published");
//! assert_eq!(order.direction, OrderDirection::Descending);
//!
//! let window = Window::new(40, 20);
//! assert_eq!(window.end(), 60);
//! ```
//!
//! [`QuerySet`]: super::QuerySet

use std::fmt;

/// Separator between segments of a field path
pub const PATH_SEPARATOR: &str = "__";

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Sort in ascending order (A-Z, 0-9)
    #[default]
    Ascending,
    /// Sort in descending order (Z-A, 9-0)
    Descending,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// A sort directive: field path plus direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Field path to sort on
    pub field: String,
    /// Sort direction
    pub direction: OrderDirection,
}

impl OrderBy {
    /// Create an ascending sort on `field`
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Ascending,
        }
    }

    /// Create a descending sort on `field`
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Descending,
        }
    }

    /// Parse the `_orderby` convention: a leading `-` means descending
    ///
    /// ```rust
    /// use acton_restless::repository::{OrderBy, OrderDirection};
    ///
    /// assert_eq!(OrderBy::parse("title"), OrderBy::asc("title"));
    /// assert_eq!(OrderBy::parse("-title").direction, OrderDirection::Descending);
    /// ```
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('-') {
            Some(field) => Self::desc(field),
            None => Self::asc(raw),
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            OrderDirection::Ascending => write!(f, "{}", self.field),
            OrderDirection::Descending => write!(f, "-{}", self.field),
        }
    }
}

/// Half-open window `[offset, offset + limit)` over a query's results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Number of results to skip
    pub offset: u64,
    /// Maximum number of results to return
    pub limit: u64,
}

impl Window {
    /// Create a new window
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// First index inside the window
    #[must_use]
    pub const fn begin(&self) -> u64 {
        self.offset
    }

    /// First index past the window (saturating)
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.offset.saturating_add(self.limit)
    }
}

/// Comparison applied by a filter condition
///
/// The names follow the lookup suffixes accepted in field paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Equal to
    Exact,
    /// Equal to, ignoring case
    IExact,
    /// Contains the value
    Contains,
    /// Contains the value, ignoring case
    IContains,
    /// Starts with the value
    StartsWith,
    /// Ends with the value
    EndsWith,
    /// Greater than
    Gt,
    /// Greater than or equal to
    Gte,
    /// Less than
    Lt,
    /// Less than or equal to
    Lte,
    /// Member of a list
    In,
    /// Is (or is not, for a false value) null
    IsNull,
}

impl Lookup {
    /// Resolve a lookup suffix, returning `None` for plain field segments
    pub fn parse(segment: &str) -> Option<Self> {
        let lookup = match segment {
            "exact" => Self::Exact,
            "iexact" => Self::IExact,
            "contains" => Self::Contains,
            "icontains" => Self::IContains,
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "in" => Self::In,
            "isnull" => Self::IsNull,
            _ => return None,
        };
        Some(lookup)
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exact => "exact",
            Self::IExact => "iexact",
            Self::Contains => "contains",
            Self::IContains => "icontains",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::IsNull => "isnull",
        };
        f.write_str(name)
    }
}

/// A value a filter condition compares against
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Raw string value, coerced by the backend to the field's type
    String(String),
    /// 64-bit integer value
    Integer(i64),
    /// Boolean value
    Boolean(bool),
    /// List of raw string values (for [`Lookup::In`])
    List(Vec<String>),
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(list: Vec<String>) -> Self {
        Self::List(list)
    }
}

/// A single filter condition over a field path
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    /// Field path, segments separated by `__`, without the lookup suffix
    pub field: String,
    /// The comparison to apply
    pub lookup: Lookup,
    /// The value to compare against
    pub value: FilterValue,
}

impl FilterCondition {
    /// Create a new filter condition
    pub fn new(field: impl Into<String>, lookup: Lookup, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            lookup,
            value: value.into(),
        }
    }

    /// Create an equality condition
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, Lookup::Exact, value)
    }

    /// Create a list membership condition
    pub fn is_in(field: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(field, Lookup::In, FilterValue::List(values))
    }

    /// Interpret a raw parameter key as a field path with an optional lookup suffix
    ///
    /// `price__gte` becomes `price` with [`Lookup::Gte`]; a key whose last
    /// segment is not a lookup is an exact match on the whole path. An `in`
    /// lookup splits its value on commas.
    ///
    /// ```rust
    /// use acton_restless::repository::{FilterCondition, FilterValue, Lookup};
    ///
    /// let by_author = FilterCondition::from_key("author__name", "Le Guin");
    /// assert_eq!(by_author.field, "author__name");
    /// assert_eq!(by_author.lookup, Lookup::Exact);
    ///
    /// let nested_in = FilterCondition::from_key("author__name__in", "a,b");
    /// assert_eq!(nested_in.field, "author__name");
    /// assert_eq!(nested_in.value, FilterValue::List(vec!["a".into(), "b".into()]));
    /// ```
    pub fn from_key(key: &str, value: &str) -> Self {
        let lookup = key
            .rsplit_once(PATH_SEPARATOR)
            .and_then(|(field, suffix)| Lookup::parse(suffix).map(|lookup| (field, lookup)));

        match lookup {
            Some((field, Lookup::In)) => Self::is_in(field, split_list(value)),
            Some((field, lookup)) => Self::new(field, lookup, value),
            None => Self::eq(key, value),
        }
    }
}

/// First segment of a `__`-separated path
pub fn root_segment(path: &str) -> &str {
    path.split(PATH_SEPARATOR).next().unwrap_or(path)
}

/// Split a comma-separated parameter into exactly the substrings around each comma
pub fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_by_parse_ascending() {
        let order = OrderBy::parse("title");
        assert_eq!(order.field, "title");
        assert_eq!(order.direction, OrderDirection::Ascending);
    }

    #[test]
    fn test_order_by_parse_descending() {
        let order = OrderBy::parse("-title");
        assert_eq!(order.field, "title");
        assert_eq!(order.direction, OrderDirection::Descending);
        assert_eq!(order.to_string(), "-title");
    }

    #[test]
    fn test_window_bounds() {
        let window = Window::new(1, 2);
        assert_eq!(window.begin(), 1);
        assert_eq!(window.end(), 3);
    }

    #[test]
    fn test_window_end_saturates() {
        let window = Window::new(u64::MAX - 1, 10);
        assert_eq!(window.end(), u64::MAX);
    }

    #[test]
    fn test_lookup_parse() {
        assert_eq!(Lookup::parse("gte"), Some(Lookup::Gte));
        assert_eq!(Lookup::parse("icontains"), Some(Lookup::IContains));
        assert_eq!(Lookup::parse("name"), None);
        assert_eq!(Lookup::parse("not_in"), None);
    }

    #[test]
    fn test_lookup_display_round_trips_parse() {
        let lookups = [Lookup::Exact, Lookup::Lt, Lookup::In, Lookup::IsNull];
        for lookup in lookups {
            assert_eq!(Lookup::parse(&lookup.to_string()), Some(lookup));
        }
    }

    #[test]
    fn test_from_key_plain_field() {
        let filter = FilterCondition::from_key("id", "1");
        assert_eq!(filter, FilterCondition::eq("id", "1"));
    }

    #[test]
    fn test_from_key_with_lookup() {
        let filter = FilterCondition::from_key("pages__lt", "300");
        assert_eq!(filter.field, "pages");
        assert_eq!(filter.lookup, Lookup::Lt);
        assert_eq!(filter.value, FilterValue::String("300".to_string()));
    }

    #[test]
    fn test_from_key_relation_path() {
        let filter = FilterCondition::from_key("author__name", "x");
        assert_eq!(filter.field, "author__name");
        assert_eq!(root_segment(&filter.field), "author");
    }

    #[test]
    fn test_split_list_keeps_empty_pieces() {
        assert_eq!(split_list("a,,b"), vec!["a", "", "b"]);
        assert_eq!(split_list(""), vec![""]);
        assert_eq!(split_list("a b,c"), vec!["a b", "c"]);
    }

    #[test]
    fn test_filter_value_conversions() {
        assert_eq!(FilterValue::from("x"), FilterValue::String("x".to_string()));
        assert_eq!(FilterValue::from(false), FilterValue::Boolean(false));
        assert_eq!(FilterValue::from(7_i64), FilterValue::Integer(7));
    }
}
