//! Filter expressions for paginated queries
//!
//! A query's filter is a tree of [`FilterExpr`] nodes: conjunctions,
//! disjunctions, single-field [`FilterCondition`] leaves, and full-text
//! [`TextSearch`] predicates. The tree is what the cursor conditions are
//! merged into, so its top-level shape is preserved exactly.
//!
//! # Example
//!
//! ```rust
//! use cursor_pagination::filter::{FilterCondition, FilterExpr, QueryKind};
//!
//! let filter = FilterExpr::and(vec![
//!     FilterCondition::eq("status", "active").into(),
//!     FilterExpr::or(vec![
//!         FilterCondition::gte("age", 18_i64).into(),
//!         FilterCondition::lt("age", 13_i64).into(),
//!     ]),
//! ]);
//! assert_eq!(filter.classify(), QueryKind::Standard);
//!
//! let search = FilterExpr::text("jane doe");
//! assert_eq!(search.classify(), QueryKind::FullTextSearch);
//! ```

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Comparison operators for filter conditions
///
/// # Example
///
/// ```rust
/// use cursor_pagination::filter::FilterOperator;
///
/// assert_eq!(format!("{}", FilterOperator::GreaterThan), ">");
/// assert_eq!(FilterOperator::GreaterThan.inverted(), FilterOperator::LessThan);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// Equal to (=)
    Equal,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal to (>=)
    GreaterThanOrEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal to (<=)
    LessThanOrEqual,
}

impl FilterOperator {
    /// Mirror a range comparison (`>` becomes `<`, `>=` becomes `<=`)
    ///
    /// Equality is returned unchanged.
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::GreaterThan => Self::LessThan,
            Self::GreaterThanOrEqual => Self::LessThanOrEqual,
            Self::LessThan => Self::GreaterThan,
            Self::LessThanOrEqual => Self::GreaterThanOrEqual,
            Self::Equal => Self::Equal,
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "="),
            Self::GreaterThan => write!(f, ">"),
            Self::GreaterThanOrEqual => write!(f, ">="),
            Self::LessThan => write!(f, "<"),
            Self::LessThanOrEqual => write!(f, "<="),
        }
    }
}

/// A value that can be used in filter conditions and cursors
///
/// # Example
///
/// ```rust
/// use cursor_pagination::filter::FilterValue;
///
/// let string_val: FilterValue = "active".into();
/// let int_val: FilterValue = 42_i64.into();
/// let id_val: FilterValue = uuid::Uuid::nil().into();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// String value
    String(String),
    /// 64-bit integer value
    Integer(i64),
    /// 64-bit floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Record identifier
    Id(Uuid),
    /// Point in time
    DateTime(DateTime<Utc>),
    /// Null value, also standing in for a missing field
    Null,
}

impl FilterValue {
    /// Order two values the way a document store would
    ///
    /// Values of the same kind compare naturally. Integers and floats compare
    /// numerically. An identifier compares against its canonical string form.
    /// A datetime compares against epoch milliseconds and against an RFC 3339
    /// string, so values that went through cursor normalization, or that a
    /// JSON document holds as text, still compare equal to the originals.
    /// Anything else is incomparable and yields `None`.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Integer(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (Self::Id(a), Self::Id(b)) => Some(a.cmp(b)),
            (Self::Id(a), Self::String(b)) => Some(a.to_string().as_str().cmp(b.as_str())),
            (Self::String(a), Self::Id(b)) => Some(a.as_str().cmp(b.to_string().as_str())),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::Integer(b)) => Some(a.timestamp_millis().cmp(b)),
            (Self::Integer(a), Self::DateTime(b)) => Some(a.cmp(&b.timestamp_millis())),
            (Self::DateTime(a), Self::String(b)) => parse_rfc3339(b).map(|b| a.cmp(&b)),
            (Self::String(a), Self::DateTime(b)) => parse_rfc3339(a).map(|a| a.cmp(b)),
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|at| at.with_timezone(&Utc))
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

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Uuid> for FilterValue {
    fn from(id: Uuid) -> Self {
        Self::Id(id)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(at: DateTime<Utc>) -> Self {
        Self::DateTime(at)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A single filter condition on one field path
///
/// # Example
///
/// ```rust
/// use cursor_pagination::filter::{FilterCondition, FilterOperator};
///
/// let filter = FilterCondition::gt("price", 100_i64);
/// assert_eq!(filter.operator, FilterOperator::GreaterThan);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    /// The field path to filter on (dotted for nested fields)
    pub field: String,
    /// The comparison operator
    pub operator: FilterOperator,
    /// The value to compare against
    pub value: FilterValue,
}

impl FilterCondition {
    /// Create a new filter condition
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Create an equality filter (field = value)
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Equal, value.into())
    }

    /// Create a greater-than filter (field > value)
    pub fn gt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::GreaterThan, value.into())
    }

    /// Create a greater-than-or-equal filter (field >= value)
    pub fn gte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::GreaterThanOrEqual, value.into())
    }

    /// Create a less-than filter (field < value)
    pub fn lt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::LessThan, value.into())
    }

    /// Create a less-than-or-equal filter (field <= value)
    pub fn lte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::LessThanOrEqual, value.into())
    }
}

/// Full-text search predicate
///
/// The store decides what "matches" means; pagination only needs to know
/// that a relevance-ranked search is in play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    /// The raw search string
    pub search: String,
}

/// How a filter must be paginated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Ordinary filter; keyset pagination applies
    Standard,
    /// Contains a full-text predicate; pagination is bypassed
    FullTextSearch,
}

/// Filter expression tree
///
/// `And(vec![])` matches every record and is the default.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// Every child must match
    And(Vec<FilterExpr>),
    /// At least one child must match
    Or(Vec<FilterExpr>),
    /// Single-field comparison
    Condition(FilterCondition),
    /// Full-text search
    Text(TextSearch),
}

impl Default for FilterExpr {
    fn default() -> Self {
        Self::all()
    }
}

impl FilterExpr {
    /// Filter that matches every record
    #[must_use]
    pub const fn all() -> Self {
        Self::And(Vec::new())
    }

    /// Conjunction of `children`
    #[must_use]
    pub fn and(children: Vec<FilterExpr>) -> Self {
        Self::And(children)
    }

    /// Disjunction of `children`
    #[must_use]
    pub fn or(children: Vec<FilterExpr>) -> Self {
        Self::Or(children)
    }

    /// Full-text search predicate
    pub fn text(search: impl Into<String>) -> Self {
        Self::Text(TextSearch {
            search: search.into(),
        })
    }

    /// Classify the filter once, up front
    ///
    /// Any full-text predicate anywhere in the tree makes the whole query a
    /// search query.
    #[must_use]
    pub fn classify(&self) -> QueryKind {
        if self.contains_text_search() {
            QueryKind::FullTextSearch
        } else {
            QueryKind::Standard
        }
    }

    fn contains_text_search(&self) -> bool {
        match self {
            Self::Text(_) => true,
            Self::Condition(_) => false,
            Self::And(children) | Self::Or(children) => {
                children.iter().any(Self::contains_text_search)
            }
        }
    }

    /// Split the expression into its top-level conjuncts
    ///
    /// The children of a root `And` are returned as-is; any other root is
    /// returned as the single conjunct. Nested structure, including a
    /// top-level `Or`, is never flattened.
    #[must_use]
    pub fn into_conjuncts(self) -> Vec<FilterExpr> {
        match self {
            Self::And(children) => children,
            other => vec![other],
        }
    }
}

impl From<FilterCondition> for FilterExpr {
    fn from(condition: FilterCondition) -> Self {
        Self::Condition(condition)
    }
}

impl From<Vec<FilterCondition>> for FilterExpr {
    fn from(conditions: Vec<FilterCondition>) -> Self {
        Self::And(conditions.into_iter().map(Self::Condition).collect())
    }
}
