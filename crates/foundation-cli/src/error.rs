//! CLI error types.

use foundation_query::QueryError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Building or running the query failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendering output failed.
    #[error("format error: {0}")]
    Format(String),
}
