//! Pagination orchestrator
//!
//! Paginating a query is a pure pipeline around a single store round trip:
//!
//! 1. [`Paginator::build_effective_query`] normalizes sort and limit, decodes
//!    the cursors and merges their keyset conditions into the filter. The
//!    caller's query is never modified.
//! 2. The store fetches `page size + 1` records with the effective filter,
//!    sort and limit.
//! 3. [`Paginator::to_connection`] turns the raw records into cursor-tagged
//!    edges and page-info, using the extra record to detect a next page.
//!
//! [`Paginator::execute`] runs all three against a [`RecordStore`], issuing
//! the optional total count concurrently with the page fetch.
//!
//! Queries with a full-text predicate are relevance ranked, so they are passed
//! through untouched and come back with undetermined page-info.
//!
//! # Example
//!
//! ```rust
//! use cursor_pagination::prelude::*;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> cursor_pagination::Result<()> {
//! let store = MemoryStore::new(Schema::new("id"));
//! store
//!     .insert_many(vec![
//!         json!({"id": uuid::Uuid::now_v7(), "date": 1, "body": "1"}),
//!         json!({"id": uuid::Uuid::now_v7(), "date": 2, "body": "2"}),
//!     ])
//!     .await;
//!
//! let paginator = Paginator::default();
//! let query = Query::find(FilterExpr::all())
//!     .with_sort(SortSpec::parse("-date"))
//!     .with_limit(1);
//!
//! let first = paginator.execute(&store, &query.clone().paginate(None, None)?).await?;
//! assert_eq!(first.results[0].node["body"], "2");
//! assert_eq!(first.page_info.has_next_page, Some(true));
//!
//! let next = first.page_info.next_cursor.as_deref();
//! let second = paginator.execute(&store, &query.paginate(next, None)?).await?;
//! assert_eq!(second.results[0].node["body"], "1");
//! assert_eq!(second.page_info.has_next_page, Some(false));
//! # Ok(())
//! # }
//! ```

use crate::conditions::{cursor_conditions, merge_conditions, Direction};
use crate::config::PaginationConfig;
use crate::connection::{Connection, Edge, PageInfo};
use crate::cursor::{self, Cursor, FieldTypeResolver};
use crate::error::Result;
use crate::filter::{FilterExpr, QueryKind};
use crate::query::PaginatedQuery;
use crate::sort::SortSpec;
use crate::store::{Document, RecordStore};

/// Everything [`Paginator::to_connection`] needs to know about the request
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationContext {
    /// Whether keyset pagination applies
    pub mode: QueryKind,
    /// Records per page; `None` in search mode
    pub page_size: Option<u64>,
    /// Order the caller sees results in, tie-breaker included
    pub display_sort: SortSpec,
    /// Which way the store was traversed
    pub direction: Direction,
    /// Whether an `after` cursor was supplied
    pub after_supplied: bool,
}

/// The query actually sent to the store
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveQuery {
    /// Caller filter with cursor conditions merged in
    pub filter: FilterExpr,
    /// Fetch order; the display order mirrored when traversing backward
    pub sort: SortSpec,
    /// Fetch limit, one more than the page size
    pub limit: Option<u64>,
    /// Post-processing context
    pub context: PaginationContext,
}

/// Keyset pagination coordinator
///
/// Holds only configuration. Each call works on the values passed in, so one
/// paginator can serve any number of concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    config: PaginationConfig,
}

impl Paginator {
    /// Create a paginator
    pub fn new(config: PaginationConfig) -> Self {
        Self { config }
    }

    /// Pagination defaults in use
    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Derive the store query for `request`
    ///
    /// Every cursor is decoded here, so a bad cursor fails before any I/O.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedCursor`](crate::Error::MalformedCursor) for a cursor
    /// that does not decode and
    /// [`Error::CursorSortMismatch`](crate::Error::CursorSortMismatch) for one
    /// holding a field outside the sort.
    pub fn build_effective_query<R>(
        &self,
        request: &PaginatedQuery,
        resolver: &R,
    ) -> Result<EffectiveQuery>
    where
        R: FieldTypeResolver + ?Sized,
    {
        let query = request.query();

        if query.filter.classify() == QueryKind::FullTextSearch {
            tracing::debug!("full-text search query, skipping cursor pagination");
            return Ok(EffectiveQuery {
                filter: query.filter.clone(),
                sort: query.sort.clone().unwrap_or_default(),
                limit: query.limit,
                context: PaginationContext {
                    mode: QueryKind::FullTextSearch,
                    page_size: None,
                    display_sort: SortSpec::new(),
                    direction: Direction::Forward,
                    after_supplied: request.after().is_some(),
                },
            });
        }

        let id_field = resolver.identifier_field();
        let mut display_sort = query.sort.clone().unwrap_or_default();
        if display_sort.is_empty() {
            tracing::debug!(field = id_field, "no sort given, sorting by identifier");
        }
        if display_sort.ensure_tie_breaker(id_field) {
            tracing::debug!(field = id_field, "appended identifier tie-breaker to sort");
        }

        let page_size = match query.limit {
            Some(limit) if limit > 0 => limit,
            _ => {
                tracing::debug!(
                    default_limit = self.config.default_limit,
                    "no limit given, using default"
                );
                self.config.default_limit
            }
        };

        let after = request
            .after()
            .map(|token| cursor::decode(token, resolver))
            .transpose()?;
        let before = request
            .before()
            .map(|token| cursor::decode(token, resolver))
            .transpose()?;

        let mut filter = query.filter.clone();
        for (cursor, direction) in [(&after, Direction::Forward), (&before, Direction::Backward)] {
            if let Some(cursor) = cursor {
                let groups = cursor_conditions(cursor, &display_sort, direction)?;
                tracing::debug!(
                    ?direction,
                    groups = groups.len(),
                    "merging cursor conditions into filter"
                );
                filter = merge_conditions(filter, groups);
            }
        }

        let direction = if before.is_some() && after.is_none() {
            Direction::Backward
        } else {
            Direction::Forward
        };
        let sort = match direction {
            Direction::Forward => display_sort.clone(),
            Direction::Backward => display_sort.reversed(),
        };

        Ok(EffectiveQuery {
            filter,
            sort,
            limit: Some(page_size.saturating_add(1)),
            context: PaginationContext {
                mode: QueryKind::Standard,
                page_size: Some(page_size),
                display_sort,
                direction,
                after_supplied: after.is_some(),
            },
        })
    }

    /// Turn raw store results into a [`Connection`]
    ///
    /// `records` must be in the order of [`EffectiveQuery::sort`]. A total
    /// count is dropped in search mode.
    pub fn to_connection<T: Document>(
        &self,
        records: Vec<T>,
        total_count: Option<u64>,
        context: &PaginationContext,
    ) -> Connection<T> {
        let page_size = match (context.mode, context.page_size) {
            (QueryKind::Standard, Some(page_size)) => page_size,
            _ => {
                let results = records.into_iter().map(Edge::uncursored).collect();
                return Connection::new(results, PageInfo::undetermined());
            }
        };

        let mut records = records;
        let has_more = records.len() as u64 > page_size;
        records.truncate(usize::try_from(page_size).unwrap_or(usize::MAX));
        if context.direction == Direction::Backward {
            records.reverse();
        }

        let results: Vec<Edge<T>> = records
            .into_iter()
            .map(|node| {
                let cursor = cursor::encode(&Cursor::from_record(&node, &context.display_sort));
                Edge::new(cursor, node)
            })
            .collect();

        let start_cursor = results.first().and_then(|edge| edge.cursor.clone());
        let next_cursor = if has_more {
            let continuation = match context.direction {
                Direction::Forward => results.last(),
                Direction::Backward => results.first(),
            };
            continuation.and_then(|edge| edge.cursor.clone())
        } else {
            None
        };

        tracing::debug!(
            returned = results.len(),
            page_size,
            has_next_page = has_more,
            direction = ?context.direction,
            "built connection"
        );

        let mut connection = Connection::new(
            results,
            PageInfo {
                has_next_page: Some(has_more),
                has_previous_page: Some(context.after_supplied),
                start_cursor,
                next_cursor,
            },
        );
        connection.total_count = total_count;
        connection
    }

    /// Paginate `request` against `store`
    ///
    /// The total count, when enabled, runs against the caller's original
    /// filter concurrently with the page fetch. The two round trips are not
    /// transactionally linked.
    ///
    /// # Errors
    ///
    /// Anything [`build_effective_query`](Self::build_effective_query)
    /// returns, and [`Error::Store`](crate::Error::Store) for store failures.
    pub async fn execute<S>(
        &self,
        store: &S,
        request: &PaginatedQuery,
    ) -> Result<Connection<S::Record>>
    where
        S: RecordStore,
    {
        let effective = self.build_effective_query(request, store)?;
        let fetch = store.find(&effective.filter, &effective.sort, effective.limit);

        let (records, total_count) = if self.config.include_total_count
            && effective.context.mode == QueryKind::Standard
        {
            let count = store.count(&request.query().filter);
            let (records, total) = futures::try_join!(fetch, count)?;
            (records, Some(total))
        } else {
            (fetch.await?, None)
        };

        Ok(self.to_connection(records, total_count, &effective.context))
    }
}
