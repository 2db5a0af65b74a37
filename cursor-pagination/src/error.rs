//! Error types for cursor pagination

use thiserror::Error;

use crate::query::QueryOperation;
use crate::store::StoreError;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while paginating a query
///
/// The first three variants are caller mistakes and are raised before any
/// store round trip. Store failures are carried through unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// Pagination was requested on something other than a find query
    #[error("Cannot paginate on any operation other than find (got {operation})")]
    UnsupportedOperation {
        /// The operation the query was built for
        operation: QueryOperation,
    },

    /// A cursor references a field that is not part of the active sort
    #[error("Cursor field '{field}' is not part of the sort specification")]
    CursorSortMismatch {
        /// The offending cursor field
        field: String,
    },

    /// A cursor string could not be decoded
    #[error("Malformed cursor: {0}")]
    MalformedCursor(String),

    /// The record store failed
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Configuration loaded but holds an unusable value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Whether the caller built an invalid request
    ///
    /// Client errors are never worth retrying.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedOperation { .. }
                | Self::CursorSortMismatch { .. }
                | Self::MalformedCursor(_)
        )
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
