//! Paginated response envelope
//!
//! A [`Connection`] carries one page of results as cursor-tagged [`Edge`]s
//! plus the [`PageInfo`] a client needs to ask for the next page. Serialized
//! field names are camelCase:
//!
//! ```json
//! {
//!   "totalCount": 2,
//!   "results": [{ "cursor": "eyJkYXRlIjoxfQ", "node": { "body": "2" } }],
//!   "pageInfo": {
//!     "hasNextPage": true,
//!     "hasPreviousPage": false,
//!     "startCursor": "eyJkYXRlIjoxfQ",
//!     "nextCursor": "eyJkYXRlIjoxfQ"
//!   }
//! }
//! ```
//!
//! `null` in page-info means "undetermined", which is what full-text search
//! queries get since they are never cursor-paginated.

use serde::{Deserialize, Serialize};

/// Page position metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether more records follow this page, if known
    pub has_next_page: Option<bool>,
    /// Whether this page was reached through an `after` cursor, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_previous_page: Option<bool>,
    /// Cursor of the first edge
    pub start_cursor: Option<String>,
    /// Cursor to continue from, present only when there is a next page
    pub next_cursor: Option<String>,
}

impl PageInfo {
    /// Page-info with every field undetermined
    ///
    /// ```rust
    /// use cursor_pagination::connection::PageInfo;
    ///
    /// let json = serde_json::to_value(PageInfo::undetermined()).unwrap();
    /// assert_eq!(
    ///     json,
    ///     serde_json::json!({"hasNextPage": null, "startCursor": null, "nextCursor": null})
    /// );
    /// ```
    #[must_use]
    pub fn undetermined() -> Self {
        Self::default()
    }
}

/// A record and its position marker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge<T> {
    /// Encoded cursor of `node`; absent for search results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// The record
    pub node: T,
}

impl<T> Edge<T> {
    /// Edge with a cursor
    pub fn new(cursor: String, node: T) -> Self {
        Self {
            cursor: Some(cursor),
            node,
        }
    }

    /// Edge without a cursor
    pub fn uncursored(node: T) -> Self {
        Self { cursor: None, node }
    }

    /// Map the node to a new type, keeping the cursor
    pub fn map<U, F>(self, f: F) -> Edge<U>
    where
        F: FnOnce(T) -> U,
    {
        Edge {
            cursor: self.cursor,
            node: f(self.node),
        }
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    /// Number of records matching the filter, ignoring cursors, if counted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    /// The page, in display order
    pub results: Vec<Edge<T>>,
    /// Position metadata
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    /// Create a connection without a total count
    pub fn new(results: Vec<Edge<T>>, page_info: PageInfo) -> Self {
        Self {
            total_count: None,
            results,
            page_info,
        }
    }

    /// Set the total count
    #[must_use]
    pub fn with_total_count(mut self, total_count: u64) -> Self {
        self.total_count = Some(total_count);
        self
    }

    /// The records of this page, in display order
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.results.iter().map(|edge| &edge.node)
    }

    /// Consume the connection, keeping only the records
    pub fn into_nodes(self) -> Vec<T> {
        self.results.into_iter().map(|edge| edge.node).collect()
    }

    /// Map every node to a new type
    pub fn map<U, F>(self, mut f: F) -> Connection<U>
    where
        F: FnMut(T) -> U,
    {
        Connection {
            total_count: self.total_count,
            results: self.results.into_iter().map(|edge| edge.map(&mut f)).collect(),
            page_info: self.page_info,
        }
    }

    /// Number of edges
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the page is empty
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_camel_case() {
        let connection = Connection::new(
            vec![Edge::new("abc".to_string(), json!({"body": "2"}))],
            PageInfo {
                has_next_page: Some(true),
                has_previous_page: Some(false),
                start_cursor: Some("abc".to_string()),
                next_cursor: Some("abc".to_string()),
            },
        )
        .with_total_count(2);

        let value = serde_json::to_value(&connection).unwrap();
        assert_eq!(
            value,
            json!({
                "totalCount": 2,
                "results": [{"cursor": "abc", "node": {"body": "2"}}],
                "pageInfo": {
                    "hasNextPage": true,
                    "hasPreviousPage": false,
                    "startCursor": "abc",
                    "nextCursor": "abc"
                }
            })
        );
    }

    #[test]
    fn test_undetermined_connection_omits_optional_fields() {
        let connection = Connection::new(vec![Edge::uncursored(1)], PageInfo::undetermined());
        let value = serde_json::to_value(&connection).unwrap();
        assert_eq!(
            value,
            json!({
                "results": [{"node": 1}],
                "pageInfo": {"hasNextPage": null, "startCursor": null, "nextCursor": null}
            })
        );
    }

    #[test]
    fn test_deserialize_round_trip() {
        let json = r#"{"results":[{"node":"x"}],"pageInfo":{"hasNextPage":false,"startCursor":null,"nextCursor":null}}"#;
        let connection: Connection<String> = serde_json::from_str(json).unwrap();
        assert_eq!(connection.total_count, None);
        assert_eq!(connection.page_info.has_previous_page, None);
        assert_eq!(connection.page_info.has_next_page, Some(false));
        assert_eq!(connection.into_nodes(), vec!["x".to_string()]);
    }

    #[test]
    fn test_map_keeps_cursors() {
        let connection = Connection::new(
            vec![Edge::new("c1".to_string(), 1), Edge::new("c2".to_string(), 2)],
            PageInfo::undetermined(),
        );
        let mapped = connection.map(|n| n * 10);
        assert_eq!(mapped.nodes().copied().collect::<Vec<_>>(), vec![10, 20]);
        assert_eq!(mapped.results[1].cursor.as_deref(), Some("c2"));
        assert_eq!(mapped.len(), 2);
        assert!(!mapped.is_empty());
    }
}
