//! MailUp API client implementation.

use crate::auth::Credentials;
use crate::config::{MailUpConfig, MailUpConfigBuilder};
use crate::diagnostics::DiagnosticSink;
use crate::errors::MailUpResult;
use crate::pagination::Pager;
use crate::resilience::RetryConfig;
use crate::services::*;
use crate::transport::{HttpTransport, ReqwestTransport};
use std::sync::Arc;
use std::time::Duration;

mod executor;
pub use executor::{RequestExecutor, RequestOptions};

/// MailUp Console API client.
///
/// This is the main entry point. It owns the credentials and token state
/// and hands out services that share one [`RequestExecutor`]. Cloning is
/// cheap and clones share tokens.
#[derive(Clone)]
pub struct MailUpClient {
    executor: Arc<RequestExecutor>,
}

impl MailUpClient {
    /// Creates a new, not yet logged-in client.
    ///
    /// The first request logs in on demand; call [`login`](Self::login) or
    /// use [`connect`](Self::connect) to surface credential errors up front.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use integrations_mailup::{Credentials, MailUpClient, MailUpConfig};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = MailUpConfig::builder()
    ///     .credentials(Credentials::new("m12345", "password", "client-id", "client-secret"))
    ///     .build()?;
    ///
    /// let client = MailUpClient::new(config)?;
    /// client.login().await?;
    /// let groups = client.lists().groups(1).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: MailUpConfig) -> MailUpResult<Self> {
        let transport = ReqwestTransport::with_connect_timeout(config.connect_timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a client over a custom transport.
    pub fn with_transport(
        config: MailUpConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> MailUpResult<Self> {
        config.validate()?;

        Ok(Self {
            executor: Arc::new(RequestExecutor::new(config, transport)),
        })
    }

    /// Creates a client and logs in with the password grant.
    pub async fn connect(config: MailUpConfig) -> MailUpResult<Self> {
        let client = Self::new(config)?;
        client.login().await?;
        Ok(client)
    }

    /// Creates a new client builder.
    pub fn builder() -> MailUpClientBuilder {
        MailUpClientBuilder::new()
    }

    /// Logs in with the password grant, replacing any stored tokens.
    pub async fn login(&self) -> MailUpResult<()> {
        self.executor.login().await
    }

    /// Returns true if the client holds a token pair.
    pub async fn is_authenticated(&self) -> bool {
        self.executor.is_authenticated().await
    }

    // Service accessors

    /// Access the recipient fields service.
    pub fn fields(&self) -> FieldsService {
        FieldsService::new(self.executor.clone())
    }

    /// Access the lists service.
    pub fn lists(&self) -> ListsService {
        ListsService::new(self.executor.clone())
    }

    /// Access the groups service.
    pub fn groups(&self) -> GroupsService {
        GroupsService::new(self.executor.clone())
    }

    /// Access the recipients service.
    pub fn recipients(&self) -> RecipientsService {
        RecipientsService::new(self.executor.clone())
    }

    /// Access the messages service.
    pub fn messages(&self) -> MessagesService {
        MessagesService::new(self.executor.clone())
    }

    /// Access the pager for listings without a dedicated service.
    pub fn pager(&self) -> Pager {
        Pager::new(self.executor.clone())
    }

    /// Gets the configuration.
    pub fn config(&self) -> &MailUpConfig {
        self.executor.config()
    }

    /// Gets the request executor (for endpoints without a service).
    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }
}

/// Builder for [`MailUpClient`].
pub struct MailUpClientBuilder {
    config_builder: MailUpConfigBuilder,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl MailUpClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config_builder: MailUpConfig::builder(),
            transport: None,
        }
    }

    /// Sets the credentials.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.config_builder = self.config_builder.credentials(credentials);
        self
    }

    /// Sets the Console base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(url);
        self
    }

    /// Sets the OAuth token endpoint.
    pub fn auth_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.auth_url(url);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.connect_timeout(timeout);
        self
    }

    /// Sets the maximum number of sends per rate-limited request.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config_builder = self.config_builder.max_retries(retries);
        self
    }

    /// Sets the rate-limit back-off policy.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config_builder = self.config_builder.retry(retry);
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(ua);
        self
    }

    /// Sets the failed-request diagnostic sink.
    pub fn diagnostics<S: DiagnosticSink + 'static>(mut self, sink: S) -> Self {
        self.config_builder = self.config_builder.diagnostics(sink);
        self
    }

    /// Sets a custom transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client.
    pub fn build(self) -> MailUpResult<MailUpClient> {
        let config = self.config_builder.build()?;
        match self.transport {
            Some(transport) => MailUpClient::with_transport(config, transport),
            None => MailUpClient::new(config),
        }
    }
}

impl Default for MailUpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
