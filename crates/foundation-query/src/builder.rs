//! Query string construction.
//!
//! Produces the OpenObserve SQL dialect:
//!
//! ```text
//! SELECT * FROM {stream} [WHERE {cond} AND ...] ORDER BY _timestamp {ASC|DESC} LIMIT {size}
//! ```
//!
//! Every user-derived fragment enters as a [`Sanitized`] value, so a query
//! string cannot be assembled from unchecked input.

use std::fmt::Write as _;

use tracing::debug;

use crate::error::Result;
use crate::sanitize::{
    sanitize_log_level, sanitize_service_name, sanitize_size, sanitize_stream_name,
    sanitize_trace_id,
};
use crate::sanitized::{LevelName, ResultSize, Sanitized, ServiceName, StreamName, TraceId};
use crate::types::{LogLevel, QueryFilter, SortOrder};

/// Column holding the trace id.
pub const TRACE_ID_COLUMN: &str = "trace_id";
/// Column holding the level name.
pub const LEVEL_COLUMN: &str = "level";
/// Column holding the service name.
pub const SERVICE_COLUMN: &str = "service";
/// Column holding the event time in microseconds.
pub const TIMESTAMP_COLUMN: &str = "_timestamp";

/// Assembles a query from sanitized fragments.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    stream: Sanitized<StreamName>,
    select: &'static str,
    conditions: Vec<String>,
    group_by: Option<&'static str>,
    order: Option<SortOrder>,
    limit: Option<ResultSize>,
}

impl QueryBuilder {
    /// Start a `SELECT *` query over `stream`.
    #[must_use]
    pub fn new(stream: Sanitized<StreamName>) -> Self {
        Self {
            stream,
            select: "*",
            conditions: Vec::new(),
            group_by: None,
            order: Some(SortOrder::Desc),
            limit: None,
        }
    }

    /// Add `trace_id = '<id>'`.
    #[must_use]
    pub fn trace_id(mut self, trace_id: &Sanitized<TraceId>) -> Self {
        self.push_eq(TRACE_ID_COLUMN, trace_id.as_str());
        self
    }

    /// Add `level = '<level>'`.
    #[must_use]
    pub fn level(mut self, level: &Sanitized<LevelName>) -> Self {
        self.push_eq(LEVEL_COLUMN, level.as_str());
        self
    }

    /// Add `service = '<name>'`.
    #[must_use]
    pub fn service(mut self, service: &Sanitized<ServiceName>) -> Self {
        self.push_eq(SERVICE_COLUMN, service.as_str());
        self
    }

    /// Set the `_timestamp` ordering.
    #[must_use]
    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Set the `LIMIT`.
    #[must_use]
    pub fn limit(mut self, size: ResultSize) -> Self {
        self.limit = Some(size);
        self
    }

    /// Turn this into `SELECT level, COUNT(*) as count ... GROUP BY level`.
    ///
    /// Aggregations carry no ordering.
    #[must_use]
    pub fn count_by_level(mut self) -> Self {
        self.select = "level, COUNT(*) as count";
        self.group_by = Some(LEVEL_COLUMN);
        self.order = None;
        self
    }

    fn push_eq(&mut self, column: &str, value: &str) {
        self.conditions.push(format!("{column} = '{value}'"));
    }

    /// Render the query string.
    #[must_use]
    pub fn build(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.select, self.stream);
        if !self.conditions.is_empty() {
            let _ = write!(sql, " WHERE {}", self.conditions.join(" AND "));
        }
        if let Some(column) = self.group_by {
            let _ = write!(sql, " GROUP BY {column}");
        }
        if let Some(order) = self.order {
            let _ = write!(sql, " ORDER BY {TIMESTAMP_COLUMN} {}", order.as_sql());
        }
        if let Some(limit) = self.limit {
            let _ = write!(sql, " LIMIT {limit}");
        }
        sql
    }
}

/// Build the filter query for the CLI.
///
/// `stream` and `size` are always sanitized. Optional filters that are
/// absent or empty are skipped; the rest are sanitized and appended in
/// the order trace_id, level, service. Results are newest first.
///
/// ```
/// use foundation_query::build_query;
///
/// let sql = build_query(Some("abc123"), None, None, "default", 50)?;
/// assert_eq!(
///     sql,
///     "SELECT * FROM default WHERE trace_id = 'abc123' ORDER BY _timestamp DESC LIMIT 50"
/// );
/// # Ok::<(), foundation_query::QueryError>(())
/// ```
///
/// # Errors
///
/// Returns `QueryError::InvalidInput` naming the first field that fails.
pub fn build_query(
    trace_id: Option<&str>,
    level: Option<&str>,
    service: Option<&str>,
    stream: &str,
    size: i64,
) -> Result<String> {
    let stream = sanitize_stream_name(stream)?;
    let size = sanitize_size(size)?;

    let mut builder = QueryBuilder::new(stream).limit(size);
    if let Some(id) = present(trace_id) {
        builder = builder.trace_id(&sanitize_trace_id(id)?);
    }
    if let Some(level) = present(level) {
        builder = builder.level(&sanitize_log_level(level)?);
    }
    if let Some(service) = present(service) {
        builder = builder.service(&sanitize_service_name(service)?);
    }

    let sql = builder.build();
    debug!(%sql, "built query");
    Ok(sql)
}

/// Build the filter query from a [`QueryFilter`].
///
/// # Errors
///
/// Returns `QueryError::InvalidInput` naming the first field that fails.
pub fn build_filter_query(filter: &QueryFilter) -> Result<String> {
    build_query(
        filter.trace_id.as_deref(),
        filter.level.map(LogLevel::as_str),
        filter.service.as_deref(),
        &filter.stream,
        filter.size,
    )
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
