use crate::config::RetryPolicy;
use crate::ClientError;
use std::time::Duration;
use url::Url;

/// Environment variable consulted for the API key when none is given.
pub const API_KEY_ENV: &str = "DRIFTLINE_API_KEY";

/// Environment variable overriding the service base URL.
pub const API_URL_ENV: &str = "DRIFTLINE_API_URL";

/// Default service endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.driftline.dev";

/// Configuration shared by both client variants
///
/// Built via [`ClientConfig::builder`]. Construction fails with
/// [`ClientError::MissingApiKey`] when no credential is available, before
/// any network activity takes place.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bearer credential sent with every request
    pub api_key: String,

    /// Validated service base URL (no trailing slash)
    pub base_url: String,

    /// User-Agent header value
    pub user_agent: String,

    /// Optional transport-level request timeout
    pub timeout: Option<Duration>,

    /// Retry behavior for transient failures
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Builds a configuration entirely from the environment.
    pub fn from_env() -> Result<Self, ClientError> {
        ClientConfigBuilder::default().build()
    }

    /// Full URL for a versioned endpoint path.
    pub(crate) fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/v1/{}", self.base_url, endpoint)
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Default, Clone)]
pub struct ClientConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
}

impl ClientConfigBuilder {
    /// Sets the API key explicitly, overriding the environment.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the service base URL, overriding the environment and default.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Overrides the User-Agent header value.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Sets a transport-level timeout applied to every request.
    ///
    /// This is local enforcement on the connection; the remote service's own
    /// per-crawl timeout is a request parameter
    /// ([`crate::RequestParams::request_timeout`]).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the retry policy for transient failures.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Resolves the credential and base URL and produces the configuration.
    ///
    /// # Errors
    ///
    /// * [`ClientError::MissingApiKey`] - no key argument and the
    ///   `DRIFTLINE_API_KEY` environment variable is unset or empty
    /// * [`ClientError::InvalidBaseUrl`] - the base URL does not parse
    pub fn build(self) -> Result<ClientConfig, ClientError> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or(ClientError::MissingApiKey)?;

        let base_url = self
            .base_url
            .or_else(|| std::env::var(API_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let parsed = Url::parse(&base_url).map_err(|source| ClientError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: source.to_string(),
        })?;
        // Reject things like "data:" or "mailto:" that parse but cannot host
        // an HTTP endpoint.
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url,
                reason: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("driftline-client/{}", env!("CARGO_PKG_VERSION")));

        Ok(ClientConfig {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent,
            timeout: self.timeout,
            retry: self.retry.unwrap_or_default(),
        })
    }
}
