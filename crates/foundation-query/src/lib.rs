//! # foundation-query
//!
//! Sanitized log queries against OpenObserve.
//!
//! This crate provides:
//!
//! - [`sanitize`] - allow-list validation for every user-supplied query fragment
//! - [`build_query`] / [`QueryBuilder`] - SQL construction from sanitized fragments
//! - [`SearchClient`] / [`OpenObserveClient`] - the backend seam and its HTTP implementation
//! - [`execute_search`] / [`LogSearch`] - execution plus trace, level, service,
//!   error, and aggregation helpers
//! - [`AmbientTraceContext`] - current trace id lookup
//!
//! ## Pipeline
//!
//! ```text
//! raw filters ─► sanitize ─► build_query ─► SearchClient::search ─► SearchResponse
//! ```
//!
//! ## Example
//!
//! ```rust
//! use foundation_query::{build_query, LogLevel};
//!
//! let sql = build_query(None, Some(LogLevel::Error.as_str()), Some("api"), "default", 20)?;
//! assert_eq!(
//!     sql,
//!     "SELECT * FROM default WHERE level = 'ERROR' AND service = 'api' ORDER BY _timestamp DESC LIMIT 20"
//! );
//! # Ok::<(), foundation_query::QueryError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod sanitize;
pub mod sanitized;
pub mod search;
pub mod time;
pub mod trace;
pub mod types;

#[cfg(test)]
mod tests;

pub use builder::{build_filter_query, build_query, QueryBuilder};
pub use client::{OpenObserveClient, SearchClient};
pub use config::OpenObserveConfig;
pub use error::{QueryError, Result};
pub use sanitize::{
    sanitize_log_level, sanitize_service_name, sanitize_size, sanitize_stream_name,
    sanitize_trace_id, MAX_RESULT_SIZE, MIN_RESULT_SIZE,
};
pub use sanitized::{ResultSize, Sanitized};
pub use search::{execute_search, reduce_level_counts, require_current_trace, LogSearch};
pub use time::{TimeRange, TimeSpec};
pub use trace::{AmbientTraceContext, StaticTraceContext, TraceContextSource};
pub use types::{Hit, LogLevel, QueryFilter, SearchResponse, SortOrder};
