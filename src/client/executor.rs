//! Request executor with auth, rate-limit back-off, and error handling.

use crate::auth::{Authenticator, TokenPair, TokenStore};
use crate::config::MailUpConfig;
use crate::diagnostics::DiagnosticRecord;
use crate::errors::{error_description, ApiError, AuthenticationError, MailUpError, MailUpResult};
use crate::resilience::RateLimitRetry;
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use bytes::Bytes;
use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Per-call request options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra query pairs appended to the URL.
    pub query: Vec<(String, String)>,
    /// Serialized JSON body.
    pub body: Option<Bytes>,
}

impl RequestOptions {
    /// Options with no query and no body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options carrying `body` serialized as JSON.
    pub fn json<B: Serialize + ?Sized>(body: &B) -> MailUpResult<Self> {
        let bytes = serde_json::to_vec(body).map_err(|e| {
            MailUpError::configuration(format!("Failed to serialize request body: {}", e))
        })?;
        Ok(Self {
            query: Vec::new(),
            body: Some(Bytes::from(bytes)),
        })
    }

    /// Appends a query pair.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Request executor that handles authentication, rate limits and error mapping.
///
/// This is the only component that sends resource requests:
/// - Adds `Authorization`, `Content-Type` and `User-Agent` headers
/// - Resends 429 responses with bounded exponential back-off
/// - Refreshes the token once on 401 and resends; a second 401 is an error
/// - Maps every other status of 400 or above to [`ApiError`]
///
/// Token refreshes are serialized, so a client shared between tasks issues
/// one refresh for a burst of 401s.
pub struct RequestExecutor {
    config: MailUpConfig,
    transport: Arc<dyn HttpTransport>,
    authenticator: Authenticator,
    retry: RateLimitRetry,
    tokens: RwLock<TokenStore>,
    refresh_lock: Mutex<()>,
}

impl RequestExecutor {
    /// Creates a new, unauthenticated request executor.
    pub fn new(config: MailUpConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let authenticator =
            Authenticator::new(transport.clone(), config.auth_url.clone(), config.retry.clone())
                .with_timeout(config.timeout)
                .with_diagnostics(config.diagnostics.clone());
        let retry = RateLimitRetry::new(config.retry.clone());

        Self {
            config,
            transport,
            authenticator,
            retry,
            tokens: RwLock::new(TokenStore::new()),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MailUpConfig {
        &self.config
    }

    /// Joins a Console-relative path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    /// Logs in with the password grant and stores the issued tokens.
    pub async fn login(&self) -> MailUpResult<()> {
        let tokens = self.authenticator.login(&self.config.credentials).await?;
        self.set_tokens(tokens).await;
        Ok(())
    }

    /// Replaces the stored token pair.
    pub async fn set_tokens(&self, tokens: TokenPair) {
        self.tokens.write().await.set(tokens);
    }

    /// Forgets the stored token pair.
    pub async fn clear_tokens(&self) {
        self.tokens.write().await.clear();
    }

    /// Returns a snapshot of the token store.
    pub async fn token_store(&self) -> TokenStore {
        self.tokens.read().await.clone()
    }

    /// Returns true if a token pair is stored.
    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.is_authenticated()
    }

    /// Executes a request and deserializes the JSON response.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        url: &str,
        options: RequestOptions,
    ) -> MailUpResult<T> {
        self.execute(method, url, options).await?.json()
    }

    /// Executes a GET and deserializes the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> MailUpResult<T> {
        self.execute_json(HttpMethod::Get, url, RequestOptions::new())
            .await
    }

    /// Executes a request against an absolute URL.
    ///
    /// Returns the response unchanged when its status is below 400.
    #[tracing::instrument(level = "debug", skip_all, fields(method = %method, url = %url))]
    pub async fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        options: RequestOptions,
    ) -> MailUpResult<HttpResponse> {
        let mut request = HttpRequest::parse(method, url)?.with_timeout(self.config.timeout);
        if !options.query.is_empty() {
            request.url.query_pairs_mut().extend_pairs(options.query.iter());
        }
        request.body = options.body;

        let user_agent = HeaderValue::from_str(&self.config.user_agent).map_err(|e| {
            MailUpError::configuration(format!("Invalid user agent: {}", e))
        })?;

        let mut refreshed = false;

        loop {
            let (headers, sent_token) = {
                let store = self.tokens.read().await;
                let token = store.access_token().map(|t| t.expose_secret().clone());
                (store.auth_header(), token)
            };

            let mut attempt = request.clone().with_headers(headers);
            attempt.headers.insert(USER_AGENT, user_agent.clone());

            tracing::debug!(authenticated = sent_token.is_some(), "Sending request");
            let response = self.retry.send(self.transport.as_ref(), attempt).await?;
            let status = response.status;

            if status == StatusCode::UNAUTHORIZED {
                if !refreshed {
                    tracing::warn!("Unauthorized, refreshing access token");
                    self.refresh_after_unauthorized(sent_token.as_deref()).await?;
                    refreshed = true;
                    continue;
                }

                self.record_failure(&request, &response).await;
                let description = error_description(&response.body);
                tracing::warn!(description = %description, "Still unauthorized after refresh");
                return Err(AuthenticationError::Unauthorized(description).into());
            }

            if status.is_client_error() || status.is_server_error() {
                self.record_failure(&request, &response).await;
                let error = ApiError::from_body(status.as_u16(), &response.body);
                tracing::warn!(
                    status = error.status_code,
                    description = %error.description,
                    "MailUp API error"
                );
                return Err(error.into());
            }

            tracing::debug!(status = status.as_u16(), "Request succeeded");
            return Ok(response);
        }
    }

    /// Refreshes the stored tokens after `sent_token` was rejected.
    ///
    /// Holds the refresh lock for the whole exchange. If the store no longer
    /// holds `sent_token`, another caller already refreshed and nothing is sent.
    async fn refresh_after_unauthorized(&self, sent_token: Option<&str>) -> MailUpResult<()> {
        let _guard = self.refresh_lock.lock().await;

        let refresh_token = {
            let store = self.tokens.read().await;
            if !store.holds_access_token(sent_token) {
                tracing::debug!("Access token already replaced by another caller");
                return Ok(());
            }
            store.refresh_token().cloned()
        };

        let credentials = &self.config.credentials;
        let tokens = match refresh_token {
            Some(refresh_token) => self.authenticator.refresh(credentials, &refresh_token).await?,
            None => self.authenticator.login(credentials).await?,
        };

        self.tokens.write().await.set(tokens);
        Ok(())
    }

    async fn record_failure(&self, request: &HttpRequest, response: &HttpResponse) {
        let Some(sink) = &self.config.diagnostics else {
            return;
        };

        sink.record(&DiagnosticRecord {
            username: self.config.credentials.username.clone(),
            method: request.method,
            url: request.url.to_string(),
            status: response.status.as_u16(),
            response_body: String::from_utf8_lossy(&response.body).to_string(),
            request_body: request
                .body
                .as_ref()
                .map(|b| String::from_utf8_lossy(b).to_string()),
        })
        .await;
    }
}
