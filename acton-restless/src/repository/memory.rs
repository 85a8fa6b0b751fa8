//! In-memory repository backend
//!
//! [`MemoryStore`] keeps records in insertion order behind a
//! `tokio::sync::RwLock` and hands out [`MemoryQuerySet`]s that record their
//! builder steps and only read the rows when counted or fetched. Conditions
//! are evaluated against each record's `serde_json` representation, so any
//! [`Resource`] works without extra glue.
//!
//! Raw string filter values are coerced to the stored field's type: numbers
//! compare numerically, booleans accept `true`/`false`/`1`/`0`. A value that
//! cannot be coerced never matches.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use super::condition::{
    FilterCondition, FilterValue, Lookup, OrderBy, OrderDirection, Window, PATH_SEPARATOR,
};
use super::error::{RepositoryError, RepositoryOperation};
use super::traits::{Payload, QuerySet, RecordStore, RepositoryResult, Resource};

/// Record store holding everything in process memory
pub struct MemoryStore<R> {
    rows: Arc<RwLock<Vec<R>>>,
}

impl<R> Clone for MemoryStore<R> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<R> fmt::Debug for MemoryStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

impl<R: Resource> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> MemoryStore<R> {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create a store seeded with `records`, kept in the given order
    pub fn with_records(records: impl IntoIterator<Item = R>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(records.into_iter().collect())),
        }
    }

    /// Snapshot of every stored record, soft-deleted ones included
    pub async fn records(&self) -> Vec<R> {
        self.rows.read().await.clone()
    }
}

impl<R: Resource> RecordStore<R> for MemoryStore<R> {
    type Query = MemoryQuerySet<R>;

    fn query(&self) -> MemoryQuerySet<R> {
        MemoryQuerySet {
            rows: Arc::clone(&self.rows),
            steps: Vec::new(),
        }
    }

    async fn get(&self, id: &R::Id) -> RepositoryResult<Option<R>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|row| &row.id() == id).cloned())
    }

    async fn save(&self, record: R) -> RepositoryResult<R> {
        let mut rows = self.rows.write().await;
        let id = record.id();
        match rows.iter_mut().find(|row| row.id() == id) {
            Some(slot) => *slot = record.clone(),
            None => rows.push(record.clone()),
        }
        Ok(record)
    }

    async fn create(&self, payload: Payload) -> RepositoryResult<R> {
        let record: R = decode(RepositoryOperation::Create, payload)?;
        let mut rows = self.rows.write().await;
        let id = record.id();
        if rows.iter().any(|row| row.id() == id) {
            return Err(RepositoryError::already_exists(R::NAME, id.to_string()));
        }
        rows.push(record.clone());
        Ok(record)
    }

    async fn replace(&self, id: &R::Id, mut payload: Payload) -> RepositoryResult<R> {
        payload.insert(
            R::ID_FIELD.to_string(),
            encode(RepositoryOperation::Replace, id)?,
        );
        let record: R = decode(RepositoryOperation::Replace, payload)?;
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|row| &row.id() == id) {
            Some(slot) => *slot = record.clone(),
            None => rows.push(record.clone()),
        }
        Ok(record)
    }

    async fn merge(&self, id: &R::Id, payload: Payload) -> RepositoryResult<R> {
        let mut rows = self.rows.write().await;
        let Some(slot) = rows.iter_mut().find(|row| &row.id() == id) else {
            return Err(RepositoryError::not_found(
                RepositoryOperation::Merge,
                R::NAME,
                id.to_string(),
            ));
        };

        let Value::Object(mut merged) = encode(RepositoryOperation::Merge, &*slot)? else {
            return Err(RepositoryError::serialization_error(
                RepositoryOperation::Merge,
                "record did not serialize to an object",
            )
            .with_entity(R::NAME));
        };
        merged.extend(payload);
        merged.insert(R::ID_FIELD.to_string(), encode(RepositoryOperation::Merge, id)?);

        let record: R = decode(RepositoryOperation::Merge, merged)?;
        *slot = record.clone();
        Ok(record)
    }

    async fn remove(&self, id: &R::Id) -> RepositoryResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| &row.id() != id);
        Ok(rows.len() != before)
    }
}

#[derive(Debug, Clone)]
enum Step {
    Filter(Vec<FilterCondition>),
    Exclude(Vec<FilterCondition>),
    Order(OrderBy),
    Slice(Window),
}

/// Lazy query over a [`MemoryStore`]
///
/// Steps run in the order they were added when the query is evaluated, so a
/// query built before a write observes that write.
pub struct MemoryQuerySet<R> {
    rows: Arc<RwLock<Vec<R>>>,
    steps: Vec<Step>,
}

impl<R> Clone for MemoryQuerySet<R> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            steps: self.steps.clone(),
        }
    }
}

impl<R> fmt::Debug for MemoryQuerySet<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryQuerySet")
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

impl<R: Resource> MemoryQuerySet<R> {
    fn check_fields<'a>(
        &self,
        operation: RepositoryOperation,
        mut fields: impl Iterator<Item = &'a str>,
    ) -> RepositoryResult<()> {
        match fields.find(|field| !self.has_field(field)) {
            Some(field) => Err(RepositoryError::invalid_field(operation, R::NAME, field)),
            None => Ok(()),
        }
    }

    fn push(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    async fn evaluate(&self) -> RepositoryResult<Vec<R>> {
        let snapshot = self.rows.read().await.clone();
        let mut rows = snapshot
            .into_iter()
            .map(|row| encode(RepositoryOperation::Fetch, &row).map(|value| (row, value)))
            .collect::<RepositoryResult<Vec<(R, Value)>>>()?;

        for step in &self.steps {
            match step {
                Step::Filter(conditions) => {
                    rows.retain(|(_, value)| matches_all(value, conditions));
                }
                Step::Exclude(conditions) => {
                    rows.retain(|(_, value)| !matches_all(value, conditions));
                }
                Step::Order(order) => rows.sort_by(|(_, a), (_, b)| {
                    let ordering =
                        compare_values(resolve(a, &order.field), resolve(b, &order.field));
                    match order.direction {
                        OrderDirection::Ascending => ordering,
                        OrderDirection::Descending => ordering.reverse(),
                    }
                }),
                Step::Slice(window) => {
                    let end = usize::try_from(window.end()).unwrap_or(usize::MAX);
                    let begin = usize::try_from(window.begin()).unwrap_or(usize::MAX);
                    rows.truncate(end);
                    let begin = begin.min(rows.len());
                    rows.drain(..begin);
                }
            }
        }

        Ok(rows.into_iter().map(|(row, _)| row).collect())
    }
}

impl<R: Resource> QuerySet for MemoryQuerySet<R> {
    type Record = R;

    fn has_field(&self, field: &str) -> bool {
        R::has_path(field)
    }

    fn filter(self, conditions: &[FilterCondition]) -> RepositoryResult<Self> {
        if conditions.is_empty() {
            return Ok(self);
        }
        self.check_fields(
            RepositoryOperation::Filter,
            conditions.iter().map(|c| c.field.as_str()),
        )?;
        Ok(self.push(Step::Filter(conditions.to_vec())))
    }

    fn exclude(self, conditions: &[FilterCondition]) -> RepositoryResult<Self> {
        if conditions.is_empty() {
            return Ok(self);
        }
        self.check_fields(
            RepositoryOperation::Filter,
            conditions.iter().map(|c| c.field.as_str()),
        )?;
        Ok(self.push(Step::Exclude(conditions.to_vec())))
    }

    fn order_by(self, order: &OrderBy) -> RepositoryResult<Self> {
        self.check_fields(RepositoryOperation::OrderBy, std::iter::once(order.field.as_str()))?;
        Ok(self.push(Step::Order(order.clone())))
    }

    fn slice(self, window: Window) -> Self {
        self.push(Step::Slice(window))
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let rows = self.evaluate().await?;
        Ok(rows.len() as u64)
    }

    async fn fetch(&self) -> RepositoryResult<Vec<R>> {
        self.evaluate().await
    }
}

fn encode<T: serde::Serialize + ?Sized>(
    operation: RepositoryOperation,
    value: &T,
) -> RepositoryResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| RepositoryError::serialization_error(operation, e.to_string()))
}

fn decode<R: Resource>(operation: RepositoryOperation, payload: Payload) -> RepositoryResult<R> {
    serde_json::from_value(Value::Object(payload))
        .map_err(|e| {
            RepositoryError::validation_failed(operation, e.to_string()).with_entity(R::NAME)
        })
}

fn resolve<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split(PATH_SEPARATOR)
        .try_fold(record, |value, segment| value.get(segment))
}

fn matches_all(record: &Value, conditions: &[FilterCondition]) -> bool {
    conditions.iter().all(|condition| matches(record, condition))
}

fn matches(record: &Value, condition: &FilterCondition) -> bool {
    let field = resolve(record, &condition.field);

    if condition.lookup == Lookup::IsNull {
        let wanted = scalar(&condition.value)
            .and_then(|raw| parse_bool(&raw))
            .unwrap_or(true);
        return field.map_or(true, Value::is_null) == wanted;
    }

    let Some(field) = field else {
        return false;
    };

    if let FilterValue::List(items) = &condition.value {
        return condition.lookup == Lookup::In
            && items
                .iter()
                .any(|item| compare_scalar(field, item) == Some(Ordering::Equal));
    }

    let Some(raw) = scalar(&condition.value) else {
        return false;
    };

    match condition.lookup {
        Lookup::Exact | Lookup::In => compare_scalar(field, &raw) == Some(Ordering::Equal),
        Lookup::Gt => compare_scalar(field, &raw) == Some(Ordering::Greater),
        Lookup::Gte => matches!(
            compare_scalar(field, &raw),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Lookup::Lt => compare_scalar(field, &raw) == Some(Ordering::Less),
        Lookup::Lte => matches!(
            compare_scalar(field, &raw),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Lookup::IExact => text(field).is_some_and(|t| t.to_lowercase() == raw.to_lowercase()),
        Lookup::Contains => text(field).is_some_and(|t| t.contains(raw.as_ref())),
        Lookup::IContains => {
            text(field).is_some_and(|t| t.to_lowercase().contains(&raw.to_lowercase()))
        }
        Lookup::StartsWith => text(field).is_some_and(|t| t.starts_with(raw.as_ref())),
        Lookup::EndsWith => text(field).is_some_and(|t| t.ends_with(raw.as_ref())),
        Lookup::IsNull => false,
    }
}

fn scalar(value: &FilterValue) -> Option<Cow<'_, str>> {
    match value {
        FilterValue::String(s) => Some(Cow::Borrowed(s.as_str())),
        FilterValue::Integer(n) => Some(Cow::Owned(n.to_string())),
        FilterValue::Boolean(b) => Some(Cow::Owned(b.to_string())),
        FilterValue::List(_) => None,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" | "True" | "1" => Some(true),
        "false" | "False" | "0" => Some(false),
        _ => None,
    }
}

fn text(field: &Value) -> Option<String> {
    match field {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn compare_scalar(field: &Value, raw: &str) -> Option<Ordering> {
    match field {
        Value::Number(n) => {
            let rhs: f64 = raw.trim().parse().ok()?;
            n.as_f64()?.partial_cmp(&rhs)
        }
        Value::String(s) => Some(s.as_str().cmp(raw)),
        Value::Bool(b) => parse_bool(raw).map(|rhs| b.cmp(&rhs)),
        _ => None,
    }
}

fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_) | Value::Object(_)) => 4,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
