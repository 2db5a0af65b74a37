//! Record store collaborator
//!
//! Pagination never talks to a database directly. It needs three things from
//! whatever holds the records: an ordered, filtered, limited fetch; a count
//! for the same filter; and the type classification of each field path so
//! cursors can be re-hydrated. [`RecordStore`] bundles those.
//!
//! Async methods use RPITIT (Return Position Impl Trait In Traits), so
//! implementations can simply write `async fn`.
//!
//! # Example
//!
//! ```rust,ignore
//! use cursor_pagination::prelude::*;
//!
//! struct CommentStore {
//!     pool: PgPool,
//!     schema: Schema,
//! }
//!
//! impl FieldTypeResolver for CommentStore {
//!     fn field_kind(&self, path: &str) -> FieldKind {
//!         self.schema.field_kind(path)
//!     }
//! }
//!
//! impl RecordStore for CommentStore {
//!     type Record = Comment;
//!
//!     async fn find(
//!         &self,
//!         filter: &FilterExpr,
//!         sort: &SortSpec,
//!         limit: Option<u64>,
//!     ) -> StoreResult<Vec<Comment>> {
//!         // Translate the filter tree into a WHERE clause
//!         todo!()
//!     }
//!
//!     async fn count(&self, filter: &FilterExpr) -> StoreResult<u64> {
//!         todo!()
//!     }
//! }
//! ```

mod error;
pub mod memory;

use std::future::Future;

pub use error::{StoreError, StoreErrorKind, StoreOperation};
pub use memory::{MemoryStore, Schema};

use crate::cursor::FieldTypeResolver;
use crate::filter::{FilterExpr, FilterValue};
use crate::sort::SortSpec;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A record whose fields can be read by path
///
/// Paths are dotted for nested fields (`author.last_name`). Return `None`
/// for a missing field and for nested/complex values; those are never part
/// of a cursor. Return `Some(FilterValue::Null)` for an explicit null.
pub trait Document {
    /// Read the scalar value at `path`
    fn field(&self, path: &str) -> Option<FilterValue>;
}

impl Document for serde_json::Value {
    fn field(&self, path: &str) -> Option<FilterValue> {
        let mut current = self;
        for segment in path.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        match current {
            serde_json::Value::Null => Some(FilterValue::Null),
            serde_json::Value::Bool(b) => Some(FilterValue::Boolean(*b)),
            serde_json::Value::String(s) => Some(FilterValue::String(s.clone())),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(FilterValue::Integer)
                .or_else(|| n.as_f64().map(FilterValue::Float)),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

/// Sorted, filterable record store
///
/// The field type classification comes from the [`FieldTypeResolver`]
/// supertrait; [`FieldTypeResolver::identifier_field`] names the field that
/// is unique per record.
pub trait RecordStore: FieldTypeResolver + Send + Sync {
    /// Record type returned by [`find`](RecordStore::find)
    type Record: Document + Send;

    /// Fetch records matching `filter`, ordered by `sort`, at most `limit`
    ///
    /// `sort` may be empty (search queries pass the caller's sort through
    /// untouched), in which case the store's natural order applies.
    fn find(
        &self,
        filter: &FilterExpr,
        sort: &SortSpec,
        limit: Option<u64>,
    ) -> impl Future<Output = StoreResult<Vec<Self::Record>>> + Send;

    /// Count records matching `filter`
    fn count(&self, filter: &FilterExpr) -> impl Future<Output = StoreResult<u64>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_document_scalar_fields() {
        let doc = json!({
            "body": "hello",
            "score": 3,
            "ratio": 0.5,
            "pinned": false,
            "deleted_at": null,
        });
        assert_eq!(doc.field("body"), Some(FilterValue::from("hello")));
        assert_eq!(doc.field("score"), Some(FilterValue::Integer(3)));
        assert_eq!(doc.field("ratio"), Some(FilterValue::Float(0.5)));
        assert_eq!(doc.field("pinned"), Some(FilterValue::Boolean(false)));
        assert_eq!(doc.field("deleted_at"), Some(FilterValue::Null));
        assert_eq!(doc.field("missing"), None);
    }

    #[test]
    fn test_json_document_nested_paths() {
        let doc = json!({
            "author": { "first_name": "Jane", "tags": ["a", "b"] },
        });
        assert_eq!(doc.field("author.first_name"), Some(FilterValue::from("Jane")));
        // complex values are not addressable as scalars
        assert_eq!(doc.field("author"), None);
        assert_eq!(doc.field("author.tags"), None);
        assert_eq!(doc.field("author.first_name.x"), None);
    }
}
