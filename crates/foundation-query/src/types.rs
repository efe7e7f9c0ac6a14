//! Core types for log queries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// A single matched log row, as returned by the backend.
pub type Hit = serde_json::Map<String, serde_json::Value>;

/// Canonical log severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Most verbose, detailed debugging information
    Trace,
    /// Debugging information
    Debug,
    /// General information
    Info,
    /// Warning conditions
    Warn,
    /// Error conditions
    Error,
    /// Failures that need immediate attention
    Critical,
}

impl LogLevel {
    /// Every level, from least to most severe.
    pub const ALL: [Self; 6] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Critical,
    ];

    /// The canonical upper-case name stored in the `level` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = QueryError;

    /// Parses the canonical name only; `"error"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| {
                QueryError::invalid_input("level", s, "not a canonical log level name")
            })
    }
}

/// Ordering of results by `_timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest first. Used for traces so spans read chronologically.
    Asc,
    /// Newest first.
    #[default]
    Desc,
}

impl SortOrder {
    /// SQL keyword for this order.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Default stream name.
pub const DEFAULT_STREAM: &str = "default";

/// Default result cap.
pub const DEFAULT_SIZE: i64 = 100;

/// Raw, unvalidated filters for one query invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    /// Correlation id to match.
    pub trace_id: Option<String>,
    /// Level to match.
    pub level: Option<LogLevel>,
    /// Service name to match.
    pub service: Option<String>,
    /// Stream to query.
    pub stream: String,
    /// Result cap.
    pub size: i64,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            trace_id: None,
            level: None,
            service: None,
            stream: DEFAULT_STREAM.to_string(),
            size: DEFAULT_SIZE,
        }
    }
}

impl QueryFilter {
    /// Create a filter with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trace id.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Set the level.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the service.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Set the stream.
    #[must_use]
    pub fn with_stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = stream.into();
        self
    }

    /// Set the result cap.
    #[must_use]
    pub fn with_size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    /// Returns true if no optional filter is set.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.trace_id.as_deref().is_none_or(str::is_empty)
            && self.level.is_none()
            && self.service.as_deref().is_none_or(str::is_empty)
    }
}

/// Response body of an OpenObserve `_search` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Number of rows matching the query, before the size cap.
    #[serde(default)]
    pub total: u64,
    /// Returned rows.
    #[serde(default)]
    pub hits: Vec<Hit>,
    /// Server-side query time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub took: Option<u64>,
    /// Offset of the first returned row.
    #[serde(default)]
    pub from: u64,
    /// Size cap the server applied.
    #[serde(default)]
    pub size: u64,
    /// Bytes scanned, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_size: Option<u64>,
}

impl SearchResponse {
    /// Create a response from hits, with `total` equal to the hit count.
    #[must_use]
    pub fn from_hits(hits: Vec<Hit>) -> Self {
        Self {
            total: hits.len() as u64,
            size: hits.len() as u64,
            hits,
            ..Self::default()
        }
    }

    /// Returns true if the query matched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
