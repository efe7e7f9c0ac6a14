//! OpenObserve connection settings.

use std::fmt;
use std::time::Duration;

use crate::error::{QueryError, Result};
use crate::types::DEFAULT_STREAM;

/// Environment variable holding the base URL.
pub const ENV_URL: &str = "OPENOBSERVE_URL";
/// Environment variable holding the user.
pub const ENV_USER: &str = "OPENOBSERVE_USER";
/// Environment variable holding the password.
pub const ENV_PASSWORD: &str = "OPENOBSERVE_PASSWORD";
/// Environment variable holding the organization.
pub const ENV_ORG: &str = "OPENOBSERVE_ORG";
/// Environment variable holding the default stream.
pub const ENV_STREAM: &str = "OPENOBSERVE_STREAM";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "OPENOBSERVE_TIMEOUT_SECS";

/// Default organization.
pub const DEFAULT_ORGANIZATION: &str = "default";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for reaching an OpenObserve instance.
#[derive(Clone, PartialEq, Eq)]
pub struct OpenObserveConfig {
    /// Base URL, e.g. `http://localhost:5080`.
    pub url: String,
    /// Basic-auth user.
    pub user: String,
    /// Basic-auth password.
    pub password: String,
    /// Organization segment of the API path.
    pub organization: String,
    /// Stream used by the derived search helpers.
    pub stream: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl fmt::Debug for OpenObserveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenObserveConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("organization", &self.organization)
            .field("stream", &self.stream)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenObserveConfig {
    /// Create a config with the default organization, stream, and timeout.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            password: password.into(),
            organization: DEFAULT_ORGANIZATION.to_string(),
            stream: DEFAULT_STREAM.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the organization.
    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }

    /// Set the default stream.
    #[must_use]
    pub fn with_stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = stream.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read settings from the `OPENOBSERVE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::ClientUnavailable` if the URL, user, or
    /// password is missing.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::ClientUnavailable` if a required key is missing,
    /// or if the timeout is not a whole number of seconds.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| QueryError::ClientUnavailable(format!("{key} is not set")))
        };

        let mut config = Self::new(require(ENV_URL)?, require(ENV_USER)?, require(ENV_PASSWORD)?);
        if let Some(org) = get(ENV_ORG) {
            config.organization = org;
        }
        if let Some(stream) = get(ENV_STREAM) {
            config.stream = stream;
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                QueryError::ClientUnavailable(format!("{ENV_TIMEOUT_SECS} must be whole seconds"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Full URL of the search endpoint.
    #[must_use]
    pub fn search_url(&self) -> String {
        format!(
            "{}/api/{}/_search",
            self.url.trim_end_matches('/'),
            self.organization
        )
    }
}
