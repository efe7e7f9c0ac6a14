//! Allow-list sanitizers for every value interpolated into a query.
//!
//! OpenObserve's SQL dialect has no parameter binding, so each sanitizer
//! either returns its input unchanged or rejects it outright. Nothing is
//! escaped or rewritten.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{QueryError, Result};
use crate::sanitized::{LevelName, ResultSize, Sanitized, ServiceName, StreamName, TraceId};
use crate::types::LogLevel;

/// Smallest accepted result size.
pub const MIN_RESULT_SIZE: i64 = 1;

/// Largest accepted result size.
pub const MAX_RESULT_SIZE: i64 = 10_000;

static STREAM_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap_or_else(|_| unreachable!()));

static TRACE_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Fa-f0-9-]+$").unwrap_or_else(|_| unreachable!()));

static SERVICE_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap_or_else(|_| unreachable!()));

/// Sanitize a stream name.
///
/// Letters, digits, and underscores only.
///
/// # Errors
///
/// Returns `QueryError::InvalidInput` if the name contains anything else.
pub fn sanitize_stream_name(name: &str) -> Result<Sanitized<StreamName>> {
    if !STREAM_NAME_REGEX.is_match(name) {
        return Err(QueryError::invalid_input(
            "stream",
            name,
            "only letters, digits, and underscores are allowed",
        ));
    }
    Ok(Sanitized::new(name.to_string()))
}

/// Sanitize a trace id.
///
/// Accepts raw hex ids as well as UUID-formatted ids.
///
/// ```
/// use foundation_query::sanitize_trace_id;
///
/// assert!(sanitize_trace_id("4bf92f3577b34da6a3ce929d0e0e4736").is_ok());
/// assert!(sanitize_trace_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(sanitize_trace_id("x'; DROP TABLE logs; --").is_err());
/// ```
///
/// # Errors
///
/// Returns `QueryError::InvalidInput` unless the id is hex digits and hyphens.
pub fn sanitize_trace_id(trace_id: &str) -> Result<Sanitized<TraceId>> {
    if !TRACE_ID_REGEX.is_match(trace_id) {
        return Err(QueryError::invalid_input(
            "trace_id",
            trace_id,
            "only hex digits and hyphens are allowed",
        ));
    }
    Ok(Sanitized::new(trace_id.to_string()))
}

/// Sanitize a log level name.
///
/// The comparison is exact and case-sensitive against [`LogLevel::ALL`].
///
/// # Errors
///
/// Returns `QueryError::InvalidInput` for any other string.
pub fn sanitize_log_level(level: &str) -> Result<Sanitized<LevelName>> {
    if LogLevel::ALL.iter().any(|l| l.as_str() == level) {
        return Ok(Sanitized::new(level.to_string()));
    }
    Err(QueryError::invalid_input(
        "level",
        level,
        format!(
            "must be one of {}",
            LogLevel::ALL.map(LogLevel::as_str).join(", ")
        ),
    ))
}

/// Sanitize a service name.
///
/// Letters, digits, underscores, hyphens, and dots.
///
/// # Errors
///
/// Returns `QueryError::InvalidInput` if the name contains anything else.
pub fn sanitize_service_name(service: &str) -> Result<Sanitized<ServiceName>> {
    if !SERVICE_NAME_REGEX.is_match(service) {
        return Err(QueryError::invalid_input(
            "service",
            service,
            "only letters, digits, underscores, hyphens, and dots are allowed",
        ));
    }
    Ok(Sanitized::new(service.to_string()))
}

/// Sanitize a result size.
///
/// # Errors
///
/// Returns `QueryError::InvalidInput` unless `1 <= size <= 10000`.
pub fn sanitize_size(size: i64) -> Result<ResultSize> {
    if !(MIN_RESULT_SIZE..=MAX_RESULT_SIZE).contains(&size) {
        return Err(QueryError::invalid_input(
            "size",
            size.to_string(),
            format!("must be between {MIN_RESULT_SIZE} and {MAX_RESULT_SIZE}"),
        ));
    }
    Ok(ResultSize::new(size as u32))
}
