//! Crate-wide error type.
//!
//! Every fatal condition aborts the current operation (graph build, path
//! search, ancestry check) and surfaces here. An unreachable table pair is
//! not an error: the resolver returns `Ok(None)` and the ancestry check
//! returns `Ok(false)`.

use thiserror::Error;

use crate::cache::CacheError;
use crate::config::{ConnectionError, SettingsError};

/// Driver error carried by [`Error::Query`], whatever the backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for ancestry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the loader, builder, resolver, synthesizer and session.
#[derive(Error, Debug)]
pub enum Error {
    /// Opening or reopening the database connection failed.
    #[error("connection failed: {0}")]
    Connection(#[from] ConnectionError),

    /// The resolver was asked about a table the schema graph does not contain.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// The path accumulator grew past the configured depth bound.
    #[error("runaway search aborted between {start} and {end} at depth {depth}")]
    RunawaySearch {
        start: String,
        end: String,
        depth: usize,
    },

    /// A statement failed in the execution collaborator.
    #[error("query failed: {source} (sql: {sql})")]
    Query {
        sql: String,
        #[source]
        source: BoxError,
    },

    /// Two tables declare the same primary-key column name under the
    /// `reject` collision policy.
    #[error("primary key column '{column}' is shared by tables '{first}' and '{second}'")]
    PrimaryKeyCollision {
        column: String,
        first: String,
        second: String,
    },

    /// An ancestry endpoint has no single primary key to filter on.
    #[error("table '{0}' has no single-column primary key")]
    NoPrimaryKey(String),

    /// A statement returned something other than what the caller expected.
    #[error("unexpected result: {0}")]
    UnexpectedResult(String),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap a driver error together with the statement that produced it.
    pub fn query(sql: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Query {
            sql: sql.into(),
            source: source.into(),
        }
    }

    /// Check if this error means the resolver was given a bad table name.
    pub fn is_unknown_table(&self) -> bool {
        matches!(self, Self::UnknownTable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_query_error_keeps_any_driver_source() {
        let err = Error::query("SELECT 1", "server has gone away");
        assert_eq!(
            err.to_string(),
            "query failed: server has gone away (sql: SELECT 1)"
        );
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("server has gone away")
        );
    }
}
