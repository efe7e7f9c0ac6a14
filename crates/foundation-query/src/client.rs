//! Search backend clients.
//!
//! [`SearchClient`] is the seam between the executor and the backend.
//! [`OpenObserveClient`] talks to OpenObserve's `_search` endpoint over
//! HTTP; tests substitute in-process implementations.
//!
//! ```rust,no_run
//! use foundation_query::{OpenObserveClient, OpenObserveConfig, SearchClient, TimeRange};
//!
//! # async fn example() -> foundation_query::Result<()> {
//! let config = OpenObserveConfig::new("http://localhost:5080", "root@example.com", "secret");
//! let client = OpenObserveClient::new(config)?;
//! let response = client
//!     .search("SELECT * FROM default ORDER BY _timestamp DESC LIMIT 10", &TimeRange::last_hour(), 10)
//!     .await?;
//! println!("{} hits", response.total);
//! # Ok(())
//! # }
//! ```

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::OpenObserveConfig;
use crate::error::{QueryError, Result};
use crate::time::TimeRange;
use crate::types::SearchResponse;

/// A backend that can run a SQL query over a time window.
#[allow(async_fn_in_trait)]
pub trait SearchClient {
    /// Run `sql` over `range`, returning at most `size` rows.
    async fn search(&self, sql: &str, range: &TimeRange, size: u32) -> Result<SearchResponse>;
}

impl<C: SearchClient + ?Sized> SearchClient for &C {
    async fn search(&self, sql: &str, range: &TimeRange, size: u32) -> Result<SearchResponse> {
        (**self).search(sql, range, size).await
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: SearchQuery<'a>,
}

#[derive(Debug, Serialize)]
struct SearchQuery<'a> {
    sql: &'a str,
    start_time: i64,
    end_time: i64,
    from: u32,
    size: u32,
}

/// HTTP client for OpenObserve.
#[derive(Debug, Clone)]
pub struct OpenObserveClient {
    http: reqwest::Client,
    config: OpenObserveConfig,
}

impl OpenObserveClient {
    /// Create a client for the given settings.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::ClientUnavailable` if the HTTP client cannot be
    /// constructed.
    pub fn new(config: OpenObserveConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("foundation-query/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| QueryError::ClientUnavailable(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Create a client from the `OPENOBSERVE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::ClientUnavailable` if required settings are missing.
    pub fn from_env() -> Result<Self> {
        Self::new(OpenObserveConfig::from_env()?)
    }

    /// The settings this client was built with.
    #[must_use]
    pub fn config(&self) -> &OpenObserveConfig {
        &self.config
    }
}

impl SearchClient for OpenObserveClient {
    async fn search(&self, sql: &str, range: &TimeRange, size: u32) -> Result<SearchResponse> {
        let (start_time, end_time) = range.resolve(Utc::now())?;
        let body = SearchRequest {
            query: SearchQuery {
                sql,
                start_time,
                end_time,
                from: 0,
                size,
            },
        };
        let url = self.config.search_url();
        debug!(%url, %sql, start_time, end_time, size, "sending search request");

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(QueryError::SearchFailed {
                status: Some(status.as_u16()),
                message: text.trim().to_string(),
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&text)?;
        trace!(total = parsed.total, hits = parsed.hits.len(), "search response decoded");
        Ok(parsed)
    }
}
