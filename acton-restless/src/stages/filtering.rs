//! Field filtering from request parameters

use crate::error::Result;
use crate::params::RequestParams;
use crate::repository::{split_list, FilterCondition, QuerySet, PATH_SEPARATOR};

use super::QueryStage;

/// Second key segment selecting list membership
pub const IN_SUFFIX: &str = "in";

/// Second key segment selecting list exclusion
pub const NOT_IN_SUFFIX: &str = "not_in";

/// Inclusion and exclusion conditions built from one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSets {
    /// Conditions every returned record must satisfy
    pub inclusions: Vec<FilterCondition>,
    /// Conditions that, taken together, remove a record
    pub exclusions: Vec<FilterCondition>,
}

impl FilterSets {
    /// Build the condition sets for `query` from the non-reserved parameters
    ///
    /// Keys whose field path is unknown to the query are skipped.
    pub fn from_params<Q: QuerySet>(query: &Q, params: &RequestParams) -> Self {
        let mut sets = Self::default();

        for (key, value) in params.filter_params() {
            let mut segments = key.split(PATH_SEPARATOR);
            let field = segments.next().unwrap_or(key);

            if !query.has_field(field) {
                tracing::debug!(parameter = key, "skipping filter on unknown field");
                continue;
            }

            match segments.next() {
                Some(IN_SUFFIX) => sets
                    .inclusions
                    .push(FilterCondition::is_in(field, split_list(value))),
                Some(NOT_IN_SUFFIX) => sets
                    .exclusions
                    .push(FilterCondition::is_in(field, split_list(value))),
                _ => {
                    let condition = FilterCondition::from_key(key, value);
                    if query.has_field(&condition.field) {
                        sets.inclusions.push(condition);
                    } else {
                        tracing::debug!(parameter = key, "skipping filter on unknown field path");
                    }
                }
            }
        }

        sets
    }

    /// Whether no condition was built
    pub fn is_empty(&self) -> bool {
        self.inclusions.is_empty() && self.exclusions.is_empty()
    }
}

/// Stage narrowing a query with `field=value`, `field__in=` and `field__not_in=` parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryFilter;

impl<Q: QuerySet> QueryStage<Q> for QueryFilter {
    fn name(&self) -> &'static str {
        "filtering"
    }

    fn apply(&self, query: Q, params: &RequestParams) -> Result<Q> {
        let sets = FilterSets::from_params(&query, params);
        if sets.is_empty() {
            return Ok(query);
        }

        tracing::debug!(
            inclusions = sets.inclusions.len(),
            exclusions = sets.exclusions.len(),
            "applying field filters"
        );

        Ok(query
            .filter(&sets.inclusions)?
            .exclude(&sets.exclusions)?)
    }
}
