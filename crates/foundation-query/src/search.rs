//! Query execution and the derived search helpers.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::builder::QueryBuilder;
use crate::client::{OpenObserveClient, SearchClient};
use crate::error::{QueryError, Result};
use crate::sanitize::{
    sanitize_log_level, sanitize_service_name, sanitize_size, sanitize_stream_name,
    sanitize_trace_id, MAX_RESULT_SIZE,
};
use crate::sanitized::{ResultSize, Sanitized, StreamName};
use crate::time::TimeRange;
use crate::trace::TraceContextSource;
use crate::types::{Hit, LogLevel, SearchResponse, SortOrder, DEFAULT_SIZE};

/// Level recorded when an aggregation row has no `level` field.
pub const UNKNOWN_LEVEL: &str = "UNKNOWN";

/// Default row cap for trace lookups.
pub const TRACE_SEARCH_SIZE: i64 = 1000;

/// Run `sql` against `client`, or against a client built from the
/// environment when none is supplied.
///
/// Client errors propagate unchanged.
///
/// # Errors
///
/// Returns `QueryError::ClientUnavailable` if no client is supplied and the
/// environment does not configure one, or whatever the client returns.
pub async fn execute_search<C: SearchClient>(
    sql: &str,
    range: &TimeRange,
    size: u32,
    client: Option<&C>,
) -> Result<SearchResponse> {
    if let Some(client) = client {
        return client.search(sql, range, size).await;
    }
    let client = OpenObserveClient::from_env()?;
    client.search(sql, range, size).await
}

/// Stream-bound search helpers over a [`SearchClient`].
#[derive(Debug, Clone)]
pub struct LogSearch<C> {
    client: C,
    stream: Sanitized<StreamName>,
}

impl LogSearch<OpenObserveClient> {
    /// Build helpers over an OpenObserve client, using its configured stream.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidInput` if the configured stream is invalid.
    pub fn from_openobserve(client: OpenObserveClient) -> Result<Self> {
        let stream = client.config().stream.clone();
        Self::new(client, &stream)
    }
}

impl<C: SearchClient> LogSearch<C> {
    /// Bind helpers to `stream`.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidInput` if the stream name is invalid.
    pub fn new(client: C, stream: &str) -> Result<Self> {
        Ok(Self {
            client,
            stream: sanitize_stream_name(stream)?,
        })
    }

    /// The stream queries are issued against.
    #[must_use]
    pub fn stream(&self) -> &str {
        self.stream.as_str()
    }

    /// Borrow the underlying client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    async fn run(
        &self,
        builder: &QueryBuilder,
        range: &TimeRange,
        size: ResultSize,
    ) -> Result<SearchResponse> {
        let sql = builder.build();
        debug!(%sql, "executing search");
        self.client.search(&sql, range, size.get()).await
    }

    /// All rows of one trace, oldest first.
    ///
    /// Defaults to the last 24 hours.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidInput` for a malformed trace id, or the
    /// client's error.
    pub async fn search_by_trace_id(
        &self,
        trace_id: &str,
        range: Option<TimeRange>,
        size: Option<i64>,
    ) -> Result<SearchResponse> {
        let trace_id = sanitize_trace_id(trace_id)?;
        let size = sanitize_size(size.unwrap_or(TRACE_SEARCH_SIZE))?;
        let builder = QueryBuilder::new(self.stream.clone())
            .trace_id(&trace_id)
            .order(SortOrder::Asc)
            .limit(size);
        self.run(&builder, &range.unwrap_or_else(TimeRange::last_day), size)
            .await
    }

    /// Rows at exactly `level`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidInput` for a bad level or size, or the
    /// client's error.
    pub async fn search_by_level(
        &self,
        level: &str,
        range: Option<TimeRange>,
        size: Option<i64>,
    ) -> Result<SearchResponse> {
        let level = sanitize_log_level(level)?;
        let size = sanitize_size(size.unwrap_or(DEFAULT_SIZE))?;
        let builder = QueryBuilder::new(self.stream.clone())
            .level(&level)
            .order(SortOrder::Desc)
            .limit(size);
        self.run(&builder, &range.unwrap_or_default(), size).await
    }

    /// `ERROR` rows, newest first.
    ///
    /// # Errors
    ///
    /// Same as [`Self::search_by_level`].
    pub async fn search_errors(
        &self,
        range: Option<TimeRange>,
        size: Option<i64>,
    ) -> Result<SearchResponse> {
        self.search_by_level(LogLevel::Error.as_str(), range, size)
            .await
    }

    /// Rows from one service, newest first.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidInput` for a bad service name or size,
    /// or the client's error.
    pub async fn search_by_service(
        &self,
        service: &str,
        range: Option<TimeRange>,
        size: Option<i64>,
    ) -> Result<SearchResponse> {
        let service = sanitize_service_name(service)?;
        let size = sanitize_size(size.unwrap_or(DEFAULT_SIZE))?;
        let builder = QueryBuilder::new(self.stream.clone())
            .service(&service)
            .order(SortOrder::Desc)
            .limit(size);
        self.run(&builder, &range.unwrap_or_default(), size).await
    }

    /// Count rows per level.
    ///
    /// Rows without a `level` are counted under [`UNKNOWN_LEVEL`]; rows
    /// without a numeric `count` count as zero. Both cases are logged.
    ///
    /// # Errors
    ///
    /// Returns the client's error.
    pub async fn aggregate_by_level(
        &self,
        range: Option<TimeRange>,
    ) -> Result<BTreeMap<String, u64>> {
        let builder = QueryBuilder::new(self.stream.clone()).count_by_level();
        let size = sanitize_size(MAX_RESULT_SIZE)?;
        let response = self
            .run(&builder, &range.unwrap_or_default(), size)
            .await?;
        Ok(reduce_level_counts(&response.hits))
    }

    /// All rows of the trace active in `tracer`, or `None` when no trace
    /// is active.
    ///
    /// # Errors
    ///
    /// Same as [`Self::search_by_trace_id`].
    pub async fn search_current_trace<T: TraceContextSource>(
        &self,
        tracer: &T,
        range: Option<TimeRange>,
        size: Option<i64>,
    ) -> Result<Option<SearchResponse>> {
        let Some(trace_id) = tracer.current_trace_id() else {
            debug!("no active trace; skipping current-trace search");
            return Ok(None);
        };
        self.search_by_trace_id(&trace_id, range, size)
            .await
            .map(Some)
    }
}

/// Resolve the active trace id or fail.
///
/// # Errors
///
/// Returns `QueryError::NoActiveTrace` if `tracer` has none.
pub fn require_current_trace<T: TraceContextSource>(tracer: &T) -> Result<String> {
    tracer.current_trace_id().ok_or(QueryError::NoActiveTrace)
}

/// Fold `GROUP BY level` rows into a level-to-count map.
#[must_use]
pub fn reduce_level_counts(hits: &[Hit]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for hit in hits {
        let level = match hit.get("level").and_then(serde_json::Value::as_str) {
            Some(level) => level.to_string(),
            None => {
                warn!(?hit, "aggregation row has no level; counting as {UNKNOWN_LEVEL}");
                UNKNOWN_LEVEL.to_string()
            }
        };
        let count = match hit.get("count").and_then(serde_json::Value::as_u64) {
            Some(count) => count,
            None => {
                warn!(?hit, "aggregation row has no numeric count; counting as 0");
                0
            }
        };
        *counts.entry(level).or_insert(0) += count;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeSpec;
    use crate::trace::StaticTraceContext;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every call and replays a canned response.
    #[derive(Default)]
    struct RecordingClient {
        calls: Mutex<Vec<(String, TimeRange, u32)>>,
        response: SearchResponse,
        fail: bool,
    }

    impl RecordingClient {
        fn with_hits(hits: Vec<serde_json::Value>) -> Self {
            let hits = hits
                .into_iter()
                .filter_map(|v| v.as_object().cloned())
                .collect();
            Self {
                response: SearchResponse::from_hits(hits),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<(String, TimeRange, u32)> {
            self.calls.lock().expect("lock").clone()
        }
    }

    impl SearchClient for RecordingClient {
        async fn search(&self, sql: &str, range: &TimeRange, size: u32) -> Result<SearchResponse> {
            self.calls
                .lock()
                .expect("lock")
                .push((sql.to_string(), *range, size));
            if self.fail {
                return Err(QueryError::SearchFailed {
                    status: Some(500),
                    message: "boom".into(),
                });
            }
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn execute_search_uses_supplied_client() {
        let client = RecordingClient::with_hits(vec![json!({"message": "a"})]);
        let range = TimeRange::new(TimeSpec::Absolute(1), TimeSpec::Absolute(2));
        let response = execute_search("SELECT 1", &range, 7, Some(&client))
            .await
            .expect("search");
        assert_eq!(response.total, 1);
        assert_eq!(client.calls(), vec![("SELECT 1".to_string(), range, 7)]);
    }

    #[tokio::test]
    async fn execute_search_propagates_client_error() {
        let client = RecordingClient::failing();
        let err = execute_search("SELECT 1", &TimeRange::default(), 1, Some(&client))
            .await
            .expect_err("client fails");
        assert!(matches!(err, QueryError::SearchFailed { status: Some(500), .. }));
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn trace_search_is_ascending_over_last_day() {
        let client = RecordingClient::default();
        let search = LogSearch::new(&client, "default").expect("stream");
        search
            .search_by_trace_id("abc-123", None, None)
            .await
            .expect("search");

        let (sql, range, size) = client.calls().remove(0);
        assert_eq!(
            sql,
            "SELECT * FROM default WHERE trace_id = 'abc-123' ORDER BY _timestamp ASC LIMIT 1000"
        );
        assert_eq!(range, TimeRange::last_day());
        assert_eq!(size, 1000);
    }

    #[tokio::test]
    async fn trace_search_rejects_injection_without_calling_backend() {
        let client = RecordingClient::default();
        let search = LogSearch::new(&client, "default").expect("stream");
        let err = search
            .search_by_trace_id("x'; DROP TABLE logs; --", None, None)
            .await
            .expect_err("rejected");
        assert!(err.is_invalid_input());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn level_search_is_descending() {
        let client = RecordingClient::default();
        let search = LogSearch::new(&client, "app").expect("stream");
        search
            .search_by_level("WARN", None, Some(25))
            .await
            .expect("search");
        let (sql, range, size) = client.calls().remove(0);
        assert_eq!(
            sql,
            "SELECT * FROM app WHERE level = 'WARN' ORDER BY _timestamp DESC LIMIT 25"
        );
        assert_eq!(range, TimeRange::last_hour());
        assert_eq!(size, 25);
    }

    #[tokio::test]
    async fn errors_search_is_level_error() {
        let client = RecordingClient::default();
        let search = LogSearch::new(&client, "default").expect("stream");
        search.search_errors(None, None).await.expect("search");
        let (sql, _, _) = client.calls().remove(0);
        assert!(sql.contains("WHERE level = 'ERROR'"));
        assert!(sql.ends_with("ORDER BY _timestamp DESC LIMIT 100"));
    }

    #[tokio::test]
    async fn service_search() {
        let client = RecordingClient::default();
        let search = LogSearch::new(&client, "default").expect("stream");
        search
            .search_by_service("payments.api", None, None)
            .await
            .expect("search");
        let (sql, _, _) = client.calls().remove(0);
        assert!(sql.contains("WHERE service = 'payments.api'"));
        assert!(sql.contains("DESC"));
    }

    #[tokio::test]
    async fn aggregate_reduces_counts() {
        let client = RecordingClient::with_hits(vec![
            json!({"level": "INFO", "count": 10}),
            json!({"level": "ERROR", "count": 2}),
            json!({"count": 3}),
            json!({"level": "WARN"}),
        ]);
        let search = LogSearch::new(&client, "default").expect("stream");
        let counts = search.aggregate_by_level(None).await.expect("aggregate");

        assert_eq!(counts.get("INFO"), Some(&10));
        assert_eq!(counts.get("ERROR"), Some(&2));
        assert_eq!(counts.get(UNKNOWN_LEVEL), Some(&3));
        assert_eq!(counts.get("WARN"), Some(&0));

        let (sql, _, _) = client.calls().remove(0);
        assert_eq!(sql, "SELECT level, COUNT(*) as count FROM default GROUP BY level");
    }

    #[tokio::test]
    async fn current_trace_none_when_inactive() {
        let client = RecordingClient::default();
        let search = LogSearch::new(&client, "default").expect("stream");
        let result = search
            .search_current_trace(&StaticTraceContext(None), None, None)
            .await
            .expect("no error");
        assert!(result.is_none());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn current_trace_delegates_to_trace_search() {
        let client = RecordingClient::with_hits(vec![json!({"trace_id": "abc"})]);
        let search = LogSearch::new(&client, "default").expect("stream");
        let tracer = StaticTraceContext(Some("4bf92f3577b34da6a3ce929d0e0e4736".into()));
        let result = search
            .search_current_trace(&tracer, None, None)
            .await
            .expect("search");
        assert_eq!(result.map(|r| r.total), Some(1));
        let (sql, _, _) = client.calls().remove(0);
        assert!(sql.contains("trace_id = '4bf92f3577b34da6a3ce929d0e0e4736'"));
        assert!(sql.contains("ASC"));
    }

    #[test]
    fn require_current_trace_errors_when_inactive() {
        assert!(matches!(
            require_current_trace(&StaticTraceContext(None)),
            Err(QueryError::NoActiveTrace)
        ));
    }

    #[test]
    fn invalid_stream_is_rejected() {
        assert!(LogSearch::new(RecordingClient::default(), "no-hyphens").is_err());
    }
}
