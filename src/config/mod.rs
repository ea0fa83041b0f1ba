//! Configuration for the MailUp client.

use crate::auth::Credentials;
use crate::diagnostics::{DiagnosticSink, FileSink, TracingSink};
use crate::errors::{ConfigurationError, MailUpError, MailUpResult};
use crate::resilience::RetryConfig;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Default MailUp Console REST base URL.
pub const DEFAULT_BASE_URL: &str =
    "https://services.mailup.com/API/v1.1/Rest/ConsoleService.svc/Console";

/// Default MailUp OAuth2 token endpoint.
pub const DEFAULT_AUTH_URL: &str = "https://services.mailup.com/Authorization/OAuth/Token";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the MailUp client.
#[derive(Clone)]
pub struct MailUpConfig {
    /// Console credentials and application keys.
    pub credentials: Credentials,

    /// Base URL for Console resources.
    pub base_url: Url,

    /// OAuth2 token endpoint.
    pub auth_url: Url,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// User agent string.
    pub user_agent: String,

    /// Back-off policy for 429 responses.
    pub retry: RetryConfig,

    /// Receiver of failed-request diagnostics.
    pub diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

impl MailUpConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> MailUpConfigBuilder {
        MailUpConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MAILUP_USERNAME`, `MAILUP_PASSWORD`, `MAILUP_CLIENT_ID`,
    ///   `MAILUP_CLIENT_SECRET` (required)
    /// - `MAILUP_BASE_URL`, `MAILUP_AUTH_URL` (optional): endpoint overrides
    /// - `MAILUP_TIMEOUT` (optional): request timeout in seconds
    /// - `MAILUP_MAX_RETRIES` (optional): sends allowed per rate-limited request
    /// - `MAILUP_ERROR_LOG` (optional): file receiving failed-request diagnostics
    pub fn from_env() -> MailUpResult<Self> {
        fn required(name: &str) -> MailUpResult<String> {
            std::env::var(name).map_err(|_| {
                MailUpError::Configuration(ConfigurationError::MissingCredentials(format!(
                    "{} environment variable not set",
                    name
                )))
            })
        }

        let credentials = Credentials::new(
            required("MAILUP_USERNAME")?,
            required("MAILUP_PASSWORD")?,
            required("MAILUP_CLIENT_ID")?,
            required("MAILUP_CLIENT_SECRET")?,
        );

        let mut builder = MailUpConfigBuilder::new().credentials(credentials);

        if let Ok(base_url) = std::env::var("MAILUP_BASE_URL") {
            builder = builder.base_url(base_url);
        }

        if let Ok(auth_url) = std::env::var("MAILUP_AUTH_URL") {
            builder = builder.auth_url(auth_url);
        }

        if let Ok(timeout_str) = std::env::var("MAILUP_TIMEOUT") {
            if let Ok(timeout_secs) = timeout_str.parse::<u64>() {
                builder = builder.timeout(Duration::from_secs(timeout_secs));
            }
        }

        if let Ok(retries_str) = std::env::var("MAILUP_MAX_RETRIES") {
            if let Ok(retries) = retries_str.parse::<u32>() {
                builder = builder.max_retries(retries);
            }
        }

        if let Ok(path) = std::env::var("MAILUP_ERROR_LOG") {
            builder = builder.diagnostics(FileSink::new(path));
        }

        builder.build()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> MailUpResult<()> {
        if self.credentials.username.trim().is_empty() {
            return Err(MailUpError::Configuration(
                ConfigurationError::MissingCredentials("username is required".to_string()),
            ));
        }

        if self.credentials.client_id.trim().is_empty() {
            return Err(MailUpError::Configuration(
                ConfigurationError::MissingCredentials("client_id is required".to_string()),
            ));
        }

        for (name, url) in [("Base URL", &self.base_url), ("Auth URL", &self.auth_url)] {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(MailUpError::Configuration(ConfigurationError::InvalidUrl(
                    format!("{} must use http or https: {}", name, url),
                )));
            }
        }

        let retry = &self.retry;
        if retry.max_attempts == 0 {
            return Err(MailUpError::configuration(
                "retry.max_attempts must be at least 1",
            ));
        }

        if retry.min_backoff.is_zero() || retry.initial_backoff.is_zero() {
            return Err(MailUpError::configuration(
                "retry.min_backoff and retry.initial_backoff must be greater than zero",
            ));
        }

        if !retry.multiplier.is_finite() || retry.multiplier < 1.0 {
            return Err(MailUpError::configuration(format!(
                "retry.multiplier must be a finite number of at least 1.0, got {}",
                retry.multiplier
            )));
        }

        if retry.max_backoff < retry.initial_backoff || retry.max_backoff < retry.min_backoff {
            return Err(MailUpError::configuration(
                "retry.max_backoff must cover retry.initial_backoff and retry.min_backoff",
            ));
        }

        Ok(())
    }

    /// Joins a Console-relative path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl std::fmt::Debug for MailUpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailUpConfig")
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url.as_str())
            .field("auth_url", &self.auth_url.as_str())
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .field("retry", &self.retry)
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}

/// Builder for MailUpConfig.
pub struct MailUpConfigBuilder {
    credentials: Option<Credentials>,
    base_url: Option<String>,
    auth_url: Option<String>,
    timeout: Duration,
    connect_timeout: Duration,
    user_agent: Option<String>,
    retry: RetryConfig,
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

impl MailUpConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            credentials: None,
            base_url: None,
            auth_url: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: None,
            retry: RetryConfig::default(),
            diagnostics: None,
        }
    }

    /// Sets the credentials.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the OAuth token endpoint.
    pub fn auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = Some(url.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the maximum number of sends for a rate-limited request.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.retry.max_attempts = retries;
        self
    }

    /// Sets the full back-off policy.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the diagnostic sink.
    pub fn diagnostics<S: DiagnosticSink + 'static>(mut self, sink: S) -> Self {
        self.diagnostics = Some(Arc::new(sink));
        self
    }

    /// Sets the diagnostic sink from an Arc.
    pub fn diagnostics_arc(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Logs failed requests through `tracing`.
    pub fn trace_errors(self) -> Self {
        self.diagnostics(TracingSink)
    }

    /// Builds the configuration.
    pub fn build(self) -> MailUpResult<MailUpConfig> {
        let credentials = self.credentials.ok_or_else(|| {
            MailUpError::Configuration(ConfigurationError::MissingCredentials(
                "Credentials are required".to_string(),
            ))
        })?;

        let base_url = parse_url(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        let auth_url = parse_url(self.auth_url.as_deref().unwrap_or(DEFAULT_AUTH_URL))?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("integrations-mailup/{}", env!("CARGO_PKG_VERSION")));

        let config = MailUpConfig {
            credentials,
            base_url,
            auth_url,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            user_agent,
            retry: self.retry,
            diagnostics: self.diagnostics,
        };

        config.validate()?;

        Ok(config)
    }
}

impl Default for MailUpConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_url(raw: &str) -> MailUpResult<Url> {
    Url::parse(raw).map_err(|e| {
        MailUpError::Configuration(ConfigurationError::InvalidUrl(format!("{}: {}", raw, e)))
    })
}
