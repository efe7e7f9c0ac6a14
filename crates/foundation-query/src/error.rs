//! Error types for log queries.

use thiserror::Error;

/// Errors that can occur while building or executing a log query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A filter value failed its allow-list check.
    #[error("invalid {field} '{value}': {reason}")]
    InvalidInput {
        /// Name of the field that was rejected.
        field: &'static str,
        /// The raw value as supplied.
        value: String,
        /// What the field is allowed to contain.
        reason: String,
    },

    /// No search client is configured.
    #[error("search client unavailable: {0}")]
    ClientUnavailable(String),

    /// The backend call failed.
    #[error("search failed{}: {message}", status_suffix(.status))]
    SearchFailed {
        /// HTTP status, when the backend answered at all.
        status: Option<u16>,
        /// Backend or transport message.
        message: String,
    },

    /// A current-trace lookup was requested but no trace is active.
    #[error("no active trace in the current context")]
    NoActiveTrace,

    /// A time specification could not be parsed.
    #[error("invalid time specification: {0}")]
    InvalidTimeSpec(String),

    /// The backend response could not be decoded.
    #[error("failed to decode search response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl QueryError {
    /// Create an invalid-input error for a rejected field value.
    #[must_use]
    pub fn invalid_input(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a search failure without an HTTP status.
    #[must_use]
    pub fn search_failed(message: impl Into<String>) -> Self {
        Self::SearchFailed {
            status: None,
            message: message.into(),
        }
    }

    /// Returns the rejected field name for invalid-input errors.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidInput { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// Check if this error came from input validation.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        Self::SearchFailed {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

#[allow(clippy::ref_option)]
fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_names_field_and_value() {
        let err = QueryError::invalid_input("trace_id", "x'; DROP", "hex digits and hyphens only");
        assert_eq!(
            err.to_string(),
            "invalid trace_id 'x'; DROP': hex digits and hyphens only"
        );
        assert_eq!(err.field(), Some("trace_id"));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn search_failed_with_status() {
        let err = QueryError::SearchFailed {
            status: Some(401),
            message: "unauthorized".into(),
        };
        assert_eq!(err.to_string(), "search failed (HTTP 401): unauthorized");
    }

    #[test]
    fn search_failed_without_status() {
        let err = QueryError::search_failed("connection refused");
        assert_eq!(err.to_string(), "search failed: connection refused");
        assert!(err.field().is_none());
    }

    #[test]
    fn no_active_trace_message() {
        assert_eq!(
            QueryError::NoActiveTrace.to_string(),
            "no active trace in the current context"
        );
    }

    #[test]
    fn decode_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        let err: QueryError = json_err.into();
        assert!(matches!(err, QueryError::Decode(_)));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QueryError>();
    }
}
