//! Sort specifications for paginated queries
//!
//! A [`SortSpec`] is an ordered list of field paths, each with a
//! [`SortDirection`]. The order of the entries is significant: earlier fields
//! take precedence and later fields break ties between records that are equal
//! on every earlier field.
//!
//! # Example
//!
//! ```rust
//! use cursor_pagination::sort::{SortDirection, SortSpec};
//!
//! let sort = SortSpec::new().desc("date").asc("id");
//! assert_eq!(sort.direction("date"), Some(SortDirection::Descending));
//! assert_eq!(sort.keys().collect::<Vec<_>>(), vec!["date", "id"]);
//!
//! // Mongoose-style shorthand
//! assert_eq!(SortSpec::parse("-date id"), sort);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction for ordering results
///
/// # Example
///
/// ```rust
/// use cursor_pagination::sort::SortDirection;
///
/// assert_eq!(format!("{}", SortDirection::Ascending), "asc");
/// assert_eq!(SortDirection::Descending.reversed(), SortDirection::Ascending);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Sort in ascending order (A-Z, 0-9, oldest first)
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    /// Sort in descending order (Z-A, 9-0, newest first)
    #[serde(alias = "desc")]
    Descending,
}

impl SortDirection {
    /// The opposite direction
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// Ordered mapping from field path to sort direction
///
/// Field paths may be dotted (`author.last_name`). Inserting a path that is
/// already present updates its direction without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    fields: Vec<(String, SortDirection)>,
}

impl SortSpec {
    /// Create an empty sort specification
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the whitespace-separated shorthand used by document stores
    ///
    /// A leading `-` sorts the field descending; a leading `+` or no prefix
    /// sorts it ascending. Bare `-`/`+` tokens are ignored.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cursor_pagination::sort::{SortDirection, SortSpec};
    ///
    /// let sort = SortSpec::parse("-date +author.last_name id");
    /// assert_eq!(sort.len(), 3);
    /// assert_eq!(sort.direction("date"), Some(SortDirection::Descending));
    /// assert_eq!(sort.direction("author.last_name"), Some(SortDirection::Ascending));
    /// ```
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        let mut sort = Self::new();
        for token in spec.split_whitespace() {
            let (path, direction) = match token.strip_prefix('-') {
                Some(path) => (path, SortDirection::Descending),
                None => (
                    token.strip_prefix('+').unwrap_or(token),
                    SortDirection::Ascending,
                ),
            };
            if !path.is_empty() {
                sort.insert(path, direction);
            }
        }
        sort
    }

    /// Append an ascending field
    #[must_use]
    pub fn asc(mut self, path: impl Into<String>) -> Self {
        self.insert(path, SortDirection::Ascending);
        self
    }

    /// Append a descending field
    #[must_use]
    pub fn desc(mut self, path: impl Into<String>) -> Self {
        self.insert(path, SortDirection::Descending);
        self
    }

    /// Insert a field, or update its direction if it is already present
    pub fn insert(&mut self, path: impl Into<String>, direction: SortDirection) {
        let path = path.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == path) {
            Some(entry) => entry.1 = direction,
            None => self.fields.push((path, direction)),
        }
    }

    /// Append `path` ascending unless it is already part of the specification
    ///
    /// Returns `true` when the field was appended.
    pub fn ensure_tie_breaker(&mut self, path: &str) -> bool {
        if self.contains(path) {
            return false;
        }
        self.fields.push((path.to_owned(), SortDirection::Ascending));
        true
    }

    /// The same fields in the same order with every direction flipped
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .map(|(path, direction)| (path.clone(), direction.reversed()))
                .collect(),
        }
    }

    /// Direction of `path`, if it is part of the specification
    #[must_use]
    pub fn direction(&self, path: &str) -> Option<SortDirection> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == path)
            .map(|(_, direction)| *direction)
    }

    /// Whether `path` is part of the specification
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.direction(path).is_some()
    }

    /// Field paths in precedence order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(path, _)| path.as_str())
    }

    /// `(path, direction)` pairs in precedence order
    pub fn iter(&self) -> impl Iterator<Item = (&str, SortDirection)> {
        self.fields
            .iter()
            .map(|(path, direction)| (path.as_str(), *direction))
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field has been specified
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (path, direction)) in self.fields.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            match direction {
                SortDirection::Ascending => write!(f, "{path}")?,
                SortDirection::Descending => write!(f, "-{path}")?,
            }
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<(S, SortDirection)> for SortSpec {
    fn from_iter<I: IntoIterator<Item = (S, SortDirection)>>(iter: I) -> Self {
        let mut sort = Self::new();
        for (path, direction) in iter {
            sort.insert(path, direction);
        }
        sort
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_direction_display() {
        assert_eq!(format!("{}", SortDirection::Ascending), "asc");
        assert_eq!(format!("{}", SortDirection::Descending), "desc");
    }

    #[test]
    fn test_sort_direction_default() {
        assert_eq!(SortDirection::default(), SortDirection::Ascending);
    }

    #[test]
    fn test_sort_direction_serde() {
        let json = serde_json::to_string(&SortDirection::Descending).unwrap();
        assert_eq!(json, "\"descending\"");
        let parsed: SortDirection = serde_json::from_str("\"asc\"").unwrap();
        assert_eq!(parsed, SortDirection::Ascending);
    }

    #[test]
    fn test_insert_preserves_position() {
        let mut sort = SortSpec::new().asc("a").asc("b");
        sort.insert("a", SortDirection::Descending);
        assert_eq!(sort.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(sort.direction("a"), Some(SortDirection::Descending));
    }

    #[test]
    fn test_parse_shorthand() {
        let sort = SortSpec::parse("  -date  body +id - ");
        assert_eq!(
            sort.iter().collect::<Vec<_>>(),
            vec![
                ("date", SortDirection::Descending),
                ("body", SortDirection::Ascending),
                ("id", SortDirection::Ascending),
            ]
        );
        assert!(SortSpec::parse("").is_empty());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let sort = SortSpec::new().desc("date").asc("id");
        assert_eq!(sort.to_string(), "-date id");
        assert_eq!(SortSpec::parse(&sort.to_string()), sort);
    }

    #[test]
    fn test_ensure_tie_breaker() {
        let mut sort = SortSpec::new().desc("date");
        assert!(sort.ensure_tie_breaker("id"));
        assert!(!sort.ensure_tie_breaker("id"));
        assert_eq!(sort.to_string(), "-date id");

        let mut explicit = SortSpec::new().desc("id").asc("date");
        assert!(!explicit.ensure_tie_breaker("id"));
        assert_eq!(explicit.direction("id"), Some(SortDirection::Descending));
    }

    #[test]
    fn test_reversed() {
        let sort = SortSpec::new().desc("date").asc("id");
        assert_eq!(sort.reversed().to_string(), "date -id");
        assert_eq!(sort.reversed().reversed(), sort);
    }

    #[test]
    fn test_from_iterator() {
        let sort: SortSpec = vec![
            ("date", SortDirection::Descending),
            ("id", SortDirection::Ascending),
        ]
        .into_iter()
        .collect();
        assert_eq!(sort, SortSpec::new().desc("date").asc("id"));
    }
}
