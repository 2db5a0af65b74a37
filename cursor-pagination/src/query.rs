//! Queries that can be paginated
//!
//! A [`Query`] describes what the caller wants from the store: the operation,
//! a filter, an optional sort and an optional limit. Calling
//! [`Query::paginate`] on a find query attaches the optional `after`/`before`
//! cursors and yields a [`PaginatedQuery`] for the
//! [`Paginator`](crate::paginator::Paginator).
//!
//! # Example
//!
//! ```rust
//! use cursor_pagination::filter::FilterExpr;
//! use cursor_pagination::query::Query;
//! use cursor_pagination::sort::SortSpec;
//!
//! let paginated = Query::find(FilterExpr::all())
//!     .with_sort(SortSpec::parse("-date"))
//!     .with_limit(1)
//!     .paginate(None, None)
//!     .unwrap();
//! assert!(paginated.after().is_none());
//! ```

use std::fmt;

use crate::error::{Error, Result};
use crate::filter::FilterExpr;
use crate::sort::SortSpec;

/// Kind of store operation a query performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOperation {
    /// Retrieve many records
    Find,
    /// Retrieve a single record
    FindOne,
    /// Count records
    Count,
    /// Modify records
    Update,
    /// Remove records
    Delete,
}

impl fmt::Display for QueryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Find => write!(f, "find"),
            Self::FindOne => write!(f, "find_one"),
            Self::Count => write!(f, "count"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// A store query as configured by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// The operation to perform
    pub operation: QueryOperation,
    /// Records must match this filter
    pub filter: FilterExpr,
    /// Requested ordering, if any
    pub sort: Option<SortSpec>,
    /// Requested page size, if any
    pub limit: Option<u64>,
}

impl Query {
    /// Create a query for `operation`
    #[must_use]
    pub fn new(operation: QueryOperation, filter: FilterExpr) -> Self {
        Self {
            operation,
            filter,
            sort: None,
            limit: None,
        }
    }

    /// Create a find query
    #[must_use]
    pub fn find(filter: FilterExpr) -> Self {
        Self::new(QueryOperation::Find, filter)
    }

    /// Set the sort specification
    #[must_use]
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Request cursor pagination
    ///
    /// `after` resumes forward from a previous page's `next_cursor`; `before`
    /// lists the records preceding a cursor. Empty strings count as absent.
    /// Cursor strings are only decoded when the effective query is built.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`] right away unless this is a
    /// [`QueryOperation::Find`] query.
    pub fn paginate(self, after: Option<&str>, before: Option<&str>) -> Result<PaginatedQuery> {
        if self.operation != QueryOperation::Find {
            return Err(Error::UnsupportedOperation {
                operation: self.operation,
            });
        }

        let present = |cursor: Option<&str>| {
            cursor
                .filter(|token| !token.is_empty())
                .map(str::to_owned)
        };

        Ok(PaginatedQuery {
            after: present(after),
            before: present(before),
            query: self,
        })
    }
}

/// A find query with pagination requested
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedQuery {
    query: Query,
    after: Option<String>,
    before: Option<String>,
}

impl PaginatedQuery {
    /// The underlying query, exactly as the caller configured it
    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Cursor to resume after
    #[must_use]
    pub fn after(&self) -> Option<&str> {
        self.after.as_deref()
    }

    /// Cursor to list before
    #[must_use]
    pub fn before(&self) -> Option<&str> {
        self.before.as_deref()
    }
}
