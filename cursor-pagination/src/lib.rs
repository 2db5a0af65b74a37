//! # cursor-pagination
//!
//! Keyset (cursor-based) pagination for sorted, filterable record stores.
//!
//! Instead of numeric offsets, each page carries opaque cursors that encode
//! the sort-key values of a record. Resuming from a cursor means asking the
//! store for records strictly after (or before) that position in sort order,
//! which stays correct while records are inserted or removed.
//!
//! ## Features
//!
//! - **Cursor codec**: URL-safe base64 of compact JSON, typed re-hydration of
//!   identifiers and timestamps
//! - **Keyset conditions**: multi-key sorts with correct tie-breaking, in
//!   either direction
//! - **Filter merging**: cursor predicates compose with existing filters,
//!   including existing disjunctions
//! - **Over-fetch-by-one**: detects a following page without a count query
//! - **Search bypass**: full-text queries pass through with undetermined
//!   page-info
//!
//! ## Example
//!
//! ```rust,no_run
//! use cursor_pagination::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config.logging);
//!
//!     let store: MemoryStore<serde_json::Value> = MemoryStore::new(Schema::new("id"));
//!     let paginator = Paginator::new(config.pagination);
//!
//!     let request = Query::find(FilterExpr::all())
//!         .with_sort(SortSpec::parse("-date"))
//!         .with_limit(20)
//!         .paginate(None, None)?;
//!
//!     let page = paginator.execute(&store, &request).await?;
//!     println!("{}", serde_json::to_string_pretty(&page).unwrap_or_default());
//!
//!     Ok(())
//! }
//! ```

pub mod conditions;
pub mod config;
pub mod connection;
pub mod cursor;
pub mod error;
pub mod filter;
pub mod observability;
pub mod paginator;
pub mod query;
pub mod sort;
pub mod store;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::conditions::{cursor_conditions, merge_conditions, Direction};
    pub use crate::config::{Config, LoggingConfig, PaginationConfig};
    pub use crate::connection::{Connection, Edge, PageInfo};
    pub use crate::cursor::{decode, encode, Cursor, FieldKind, FieldTypeResolver};
    pub use crate::error::{Error, Result};
    pub use crate::filter::{
        FilterCondition, FilterExpr, FilterOperator, FilterValue, QueryKind, TextSearch,
    };
    pub use crate::observability::init_tracing;
    pub use crate::paginator::{EffectiveQuery, PaginationContext, Paginator};
    pub use crate::query::{PaginatedQuery, Query, QueryOperation};
    pub use crate::sort::{SortDirection, SortSpec};
    pub use crate::store::{
        Document, MemoryStore, RecordStore, Schema, StoreError, StoreErrorKind, StoreOperation,
        StoreResult,
    };
}
