//! Cursor codec
//!
//! A [`Cursor`] is the position of one record (the pivot) in a sort order:
//! the pivot's values for the sort fields, in sort order. On the wire it is
//! an opaque, URL-safe token. Callers must not look inside the token; its
//! layout is not part of any compatibility promise.
//!
//! Values are normalized before encoding so the token is compact and
//! comparable: identifiers become their canonical string, datetimes become
//! epoch milliseconds, scalars pass through and lists are dropped. Decoding
//! reverses the normalization using the field type classification supplied
//! by a [`FieldTypeResolver`].
//!
//! # Example
//!
//! ```rust
//! use cursor_pagination::cursor::{self, Cursor, FieldKind};
//!
//! let pivot = Cursor::new()
//!     .with_field("score", 42_i64)
//!     .with_field("body", "hello");
//!
//! let token = cursor::encode(&pivot);
//! let decoded = cursor::decode(&token, &|_: &str| FieldKind::Other).unwrap();
//! assert_eq!(decoded, pivot);
//! ```

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::filter::FilterValue;
use crate::sort::SortSpec;
use crate::store::Document;

/// Upper bound on the token length accepted from callers
const MAX_CURSOR_TOKEN_LEN: usize = 8 * 1024;

/// URL-safe base64 that writes no padding and tolerates it on input
const CURSOR_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Primitive type classification of a field path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldKind {
    /// Unique record identifier; hydrated as a [`Uuid`]
    Identifier,
    /// Point in time; hydrated from epoch milliseconds
    DateTime,
    /// Anything else; kept as decoded
    #[default]
    Other,
}

/// Per-field-path type classification used to re-hydrate cursors
///
/// Closures `Fn(&str) -> FieldKind` implement this trait, which is handy in
/// tests and for stores with a fixed layout.
pub trait FieldTypeResolver {
    /// Classification of the field at `path`
    fn field_kind(&self, path: &str) -> FieldKind;

    /// Field guaranteed unique per record, used as the final tie-breaker
    fn identifier_field(&self) -> &str {
        "id"
    }
}

impl<F> FieldTypeResolver for F
where
    F: Fn(&str) -> FieldKind,
{
    fn field_kind(&self, path: &str) -> FieldKind {
        self(path)
    }
}

/// Position of a pivot record within a sort order
///
/// Fields keep their insertion order, which is the sort order when the
/// cursor is built with [`Cursor::from_record`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor {
    fields: Vec<(String, FilterValue)>,
}

impl Cursor {
    /// Create an empty cursor
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Project `record` onto `sort`
    ///
    /// Fields the record does not have, or holds only as nested values, are
    /// recorded as null so the resumed page still starts after the pivot.
    pub fn from_record<D: Document + ?Sized>(record: &D, sort: &SortSpec) -> Self {
        let fields = sort
            .keys()
            .map(|path| {
                let value = record.field(path).unwrap_or(FilterValue::Null);
                (path.to_owned(), value)
            })
            .collect();
        Self { fields }
    }

    /// Builder form of [`insert`](Cursor::insert)
    #[must_use]
    pub fn with_field(mut self, path: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(path, value);
        self
    }

    /// Set the value of `path`, keeping its position if already present
    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<FilterValue>) {
        let path = path.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == path) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((path, value)),
        }
    }

    /// Value of `path`
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FilterValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == path)
            .map(|(_, value)| value)
    }

    /// Field paths in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(path, _)| path.as_str())
    }

    /// `(path, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.fields.iter().map(|(path, value)| (path.as_str(), value))
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the cursor has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Encode a cursor as an opaque, URL-safe token
///
/// Deterministic: the same cursor always yields the same token. Keys are
/// written in the cursor's own order, not alphabetically.
#[must_use]
pub fn encode(cursor: &Cursor) -> String {
    let object: Map<String, Value> = cursor
        .iter()
        .filter_map(|(path, value)| normalize(value).map(|json| (path.to_owned(), json)))
        .collect();
    CURSOR_ENGINE.encode(Value::Object(object).to_string())
}

/// Decode a token produced by [`encode`]
///
/// # Errors
///
/// Returns [`Error::MalformedCursor`] when the token is empty, oversized, not
/// valid base64, not a JSON object of primitives, or holds a value that does
/// not fit the field's [`FieldKind`].
pub fn decode<R>(token: &str, resolver: &R) -> Result<Cursor>
where
    R: FieldTypeResolver + ?Sized,
{
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::MalformedCursor("cursor token is empty".to_string()));
    }
    if token.len() > MAX_CURSOR_TOKEN_LEN {
        return Err(Error::MalformedCursor(format!(
            "cursor token exceeds max length: {} chars (max {})",
            token.len(),
            MAX_CURSOR_TOKEN_LEN
        )));
    }

    let bytes = CURSOR_ENGINE
        .decode(token)
        .map_err(|e| Error::MalformedCursor(format!("invalid base64: {e}")))?;
    let object: Map<String, Value> = serde_json::from_slice(&bytes)
        .map_err(|e| Error::MalformedCursor(format!("invalid payload: {e}")))?;

    let mut cursor = Cursor::new();
    for (path, raw) in object {
        let value = hydrate(&path, raw, resolver.field_kind(&path))?;
        cursor.insert(path, value);
    }
    Ok(cursor)
}

fn normalize(value: &FilterValue) -> Option<Value> {
    match value {
        FilterValue::Id(id) => Some(Value::String(id.to_string())),
        FilterValue::DateTime(at) => Some(Value::from(at.timestamp_millis())),
        FilterValue::String(s) => Some(Value::String(s.clone())),
        FilterValue::Integer(n) => Some(Value::from(*n)),
        // NaN and infinities have no JSON form
        FilterValue::Float(n) => serde_json::Number::from_f64(*n).map(Value::Number),
        FilterValue::Boolean(b) => Some(Value::Bool(*b)),
        FilterValue::Null => Some(Value::Null),
    }
}

fn hydrate(path: &str, raw: Value, kind: FieldKind) -> Result<FilterValue> {
    let malformed =
        |expected: &str| Error::MalformedCursor(format!("field '{path}' is not a valid {expected}"));

    match (kind, raw) {
        (_, Value::Null) => Ok(FilterValue::Null),
        (FieldKind::Identifier, Value::String(s)) => Uuid::parse_str(&s)
            .map(FilterValue::Id)
            .map_err(|_| malformed("identifier")),
        (FieldKind::Identifier, _) => Err(malformed("identifier")),
        (FieldKind::DateTime, Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(FilterValue::DateTime)
            .ok_or_else(|| malformed("timestamp")),
        // documents that store dates as text hand out RFC 3339 pivots
        (FieldKind::DateTime, Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|at| FilterValue::DateTime(at.with_timezone(&Utc)))
            .map_err(|_| malformed("timestamp")),
        (FieldKind::DateTime, _) => Err(malformed("timestamp")),
        (FieldKind::Other, Value::String(s)) => Ok(FilterValue::String(s)),
        (FieldKind::Other, Value::Bool(b)) => Ok(FilterValue::Boolean(b)),
        (FieldKind::Other, Value::Number(n)) => n
            .as_i64()
            .map(FilterValue::Integer)
            .or_else(|| n.as_f64().map(FilterValue::Float))
            .ok_or_else(|| malformed("number")),
        (FieldKind::Other, Value::Array(_) | Value::Object(_)) => Err(malformed("scalar")),
    }
}
