//! In-memory record store
//!
//! [`MemoryStore`] evaluates [`FilterExpr`] trees and [`SortSpec`] orderings
//! against records held in a vector. It backs the crate's tests and is handy
//! for prototyping a paginated endpoint before a real database is wired in.
//!
//! Comparison semantics follow [`FilterValue::compare`]: identifiers compare
//! with their string form, datetimes with epoch milliseconds or RFC 3339
//! text, and values of unrelated kinds never match a range condition.
//! Missing and null values are equal to each other and order before
//! everything else, both when sorting and in range conditions.

use std::cmp::Ordering;
use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{Document, RecordStore, StoreResult};
use crate::cursor::{FieldKind, FieldTypeResolver};
use crate::filter::{FilterCondition, FilterExpr, FilterOperator, FilterValue, TextSearch};
use crate::sort::{SortDirection, SortSpec};

/// Field classification and text index of a collection
///
/// # Example
///
/// ```rust
/// use cursor_pagination::cursor::{FieldKind, FieldTypeResolver};
/// use cursor_pagination::store::Schema;
///
/// let schema = Schema::new("id")
///     .with_field("date", FieldKind::DateTime)
///     .with_text_index(["body"]);
///
/// assert_eq!(schema.field_kind("id"), FieldKind::Identifier);
/// assert_eq!(schema.field_kind("date"), FieldKind::DateTime);
/// assert_eq!(schema.field_kind("body"), FieldKind::Other);
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    identifier_field: String,
    kinds: HashMap<String, FieldKind>,
    text_paths: Vec<String>,
}

impl Schema {
    /// Create a schema whose unique identifier lives at `identifier_field`
    pub fn new(identifier_field: impl Into<String>) -> Self {
        let identifier_field = identifier_field.into();
        let mut kinds = HashMap::new();
        kinds.insert(identifier_field.clone(), FieldKind::Identifier);
        Self {
            identifier_field,
            kinds,
            text_paths: Vec::new(),
        }
    }

    /// Classify the field at `path`
    #[must_use]
    pub fn with_field(mut self, path: impl Into<String>, kind: FieldKind) -> Self {
        self.kinds.insert(path.into(), kind);
        self
    }

    /// Paths searched by full-text predicates
    #[must_use]
    pub fn with_text_index<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.text_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Paths searched by full-text predicates
    pub fn text_paths(&self) -> &[String] {
        &self.text_paths
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new("id")
    }
}

impl FieldTypeResolver for Schema {
    fn field_kind(&self, path: &str) -> FieldKind {
        self.kinds.get(path).copied().unwrap_or_default()
    }

    fn identifier_field(&self) -> &str {
        &self.identifier_field
    }
}

/// Record store backed by a `Vec`
///
/// # Example
///
/// ```rust
/// use cursor_pagination::filter::{FilterCondition, FilterExpr};
/// use cursor_pagination::sort::SortSpec;
/// use cursor_pagination::store::{MemoryStore, RecordStore, Schema};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MemoryStore::new(Schema::new("id"));
/// store.insert_many(vec![json!({"id": "a", "n": 2}), json!({"id": "b", "n": 1})]).await;
///
/// let filter: FilterExpr = FilterCondition::gt("n", 1_i64).into();
/// let found = store.find(&filter, &SortSpec::new().asc("n"), None).await.unwrap();
/// assert_eq!(found, vec![json!({"id": "a", "n": 2})]);
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryStore<R> {
    schema: Schema,
    records: RwLock<Vec<R>>,
}

impl<R> MemoryStore<R> {
    /// Create an empty store
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            records: RwLock::new(Vec::new()),
        }
    }

    /// The store's schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Append one record
    pub async fn insert(&self, record: R) {
        self.records.write().await.push(record);
    }

    /// Append many records
    pub async fn insert_many(&self, records: impl IntoIterator<Item = R>) {
        self.records.write().await.extend(records);
    }

    /// Remove every record
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    /// Number of records held
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl<R> FieldTypeResolver for MemoryStore<R> {
    fn field_kind(&self, path: &str) -> FieldKind {
        self.schema.field_kind(path)
    }

    fn identifier_field(&self) -> &str {
        self.schema.identifier_field()
    }
}

impl<R> RecordStore for MemoryStore<R>
where
    R: Document + Clone + Send + Sync,
{
    type Record = R;

    async fn find(
        &self,
        filter: &FilterExpr,
        sort: &SortSpec,
        limit: Option<u64>,
    ) -> StoreResult<Vec<R>> {
        let records = self.records.read().await;

        let mut found: Vec<R> = records
            .iter()
            .filter(|record| self.matches(*record, filter))
            .cloned()
            .collect();

        // stable, so ties keep insertion order
        found.sort_by(|a, b| compare_records(a, b, sort));

        if let Some(limit) = limit {
            found.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }

        tracing::trace!(
            scanned = records.len(),
            returned = found.len(),
            sort = %sort,
            "memory store find"
        );
        Ok(found)
    }

    async fn count(&self, filter: &FilterExpr) -> StoreResult<u64> {
        let records = self.records.read().await;
        let count = records
            .iter()
            .filter(|record| self.matches(*record, filter))
            .count();
        Ok(count as u64)
    }
}

impl<R: Document> MemoryStore<R> {
    fn matches(&self, record: &R, filter: &FilterExpr) -> bool {
        match filter {
            FilterExpr::And(children) => children.iter().all(|child| self.matches(record, child)),
            FilterExpr::Or(children) => children.iter().any(|child| self.matches(record, child)),
            FilterExpr::Condition(condition) => condition_matches(record, condition),
            FilterExpr::Text(search) => self.text_matches(record, search),
        }
    }

    /// Any search term equals any word of an indexed field, ignoring case
    fn text_matches(&self, record: &R, search: &TextSearch) -> bool {
        let terms: Vec<String> = search
            .search
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        self.schema.text_paths.iter().any(|path| match record.field(path) {
            Some(FilterValue::String(text)) => text
                .split(|c: char| !c.is_alphanumeric())
                .filter(|word| !word.is_empty())
                .any(|word| terms.iter().any(|term| word.to_lowercase() == *term)),
            _ => false,
        })
    }
}

fn condition_matches<R: Document>(record: &R, condition: &FilterCondition) -> bool {
    let actual = record.field(&condition.field);
    let expected = &condition.value;

    match condition.operator {
        FilterOperator::Equal => values_equal(actual.as_ref(), expected),
        FilterOperator::GreaterThan => ordering(actual.as_ref(), expected) == Some(Ordering::Greater),
        FilterOperator::GreaterThanOrEqual => matches!(
            ordering(actual.as_ref(), expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOperator::LessThan => ordering(actual.as_ref(), expected) == Some(Ordering::Less),
        FilterOperator::LessThanOrEqual => matches!(
            ordering(actual.as_ref(), expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

/// A missing field equals null
fn values_equal(actual: Option<&FilterValue>, expected: &FilterValue) -> bool {
    match actual {
        None => *expected == FilterValue::Null,
        Some(value) => value.compare(expected) == Some(Ordering::Equal),
    }
}

/// Same placement as [`sort_key_ordering`]: missing and null are lowest
fn ordering(actual: Option<&FilterValue>, expected: &FilterValue) -> Option<Ordering> {
    let actual = actual.filter(|value| **value != FilterValue::Null);
    match (actual, expected) {
        (None, FilterValue::Null) => Some(Ordering::Equal),
        (None, _) => Some(Ordering::Less),
        (Some(_), FilterValue::Null) => Some(Ordering::Greater),
        (Some(value), expected) => value.compare(expected),
    }
}

fn compare_records<R: Document>(a: &R, b: &R, sort: &SortSpec) -> Ordering {
    for (path, direction) in sort.iter() {
        let ordering = sort_key_ordering(a.field(path), b.field(path));
        let ordering = match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Missing and null sort lowest; incomparable kinds tie
fn sort_key_ordering(a: Option<FilterValue>, b: Option<FilterValue>) -> Ordering {
    let a = a.filter(|value| *value != FilterValue::Null);
    let b = b.filter(|value| *value != FilterValue::Null);
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.compare(&b).unwrap_or(Ordering::Equal),
    }
}
