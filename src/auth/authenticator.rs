//! Password and refresh grants against the MailUp OAuth endpoint.

use super::{Credentials, TokenPair};
use crate::diagnostics::{DiagnosticRecord, DiagnosticSink};
use crate::errors::{error_description, AuthenticationError, MailUpError, MailUpResult};
use crate::resilience::{RateLimitRetry, RetryConfig};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Issues OAuth2 grants and returns fresh token pairs.
///
/// Holds no token state itself; callers store the returned pair.
pub struct Authenticator {
    transport: Arc<dyn HttpTransport>,
    auth_url: Url,
    retry: RateLimitRetry,
    timeout: Option<Duration>,
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

#[derive(Serialize)]
struct GrantRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

#[derive(Deserialize)]
struct GrantResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl Authenticator {
    /// Creates a new authenticator.
    pub fn new(transport: Arc<dyn HttpTransport>, auth_url: Url, retry: RetryConfig) -> Self {
        Self {
            transport,
            auth_url,
            retry: RateLimitRetry::new(retry),
            timeout: None,
            diagnostics: None,
        }
    }

    /// Reports rejected grants to `sink`.
    pub fn with_diagnostics(mut self, sink: Option<Arc<dyn DiagnosticSink>>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the OAuth endpoint.
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    /// Exchanges console credentials for a token pair (password grant).
    pub async fn login(&self, credentials: &Credentials) -> MailUpResult<TokenPair> {
        let grant = GrantRequest {
            grant_type: "password",
            client_id: &credentials.client_id,
            client_secret: credentials.client_secret.expose_secret(),
            username: Some(&credentials.username),
            password: Some(credentials.password.expose_secret()),
            refresh_token: None,
        };

        let tokens = self.grant(&credentials.username, &grant).await?;
        tracing::info!(username = %credentials.username, "Logged in to MailUp");
        Ok(tokens)
    }

    /// Exchanges a refresh token for a new token pair (refresh grant).
    pub async fn refresh(
        &self,
        credentials: &Credentials,
        refresh_token: &SecretString,
    ) -> MailUpResult<TokenPair> {
        let grant = GrantRequest {
            grant_type: "refresh_token",
            client_id: &credentials.client_id,
            client_secret: credentials.client_secret.expose_secret(),
            username: None,
            password: None,
            refresh_token: Some(refresh_token.expose_secret()),
        };

        let tokens = self.grant(&credentials.username, &grant).await?;
        tracing::info!(username = %credentials.username, "Refreshed MailUp access token");
        Ok(tokens)
    }

    async fn grant(&self, username: &str, grant: &GrantRequest<'_>) -> MailUpResult<TokenPair> {
        let form = serde_urlencoded::to_string(grant).map_err(|e| {
            MailUpError::configuration(format!("Failed to encode grant request: {}", e))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let mut request = HttpRequest::new(HttpMethod::Post, self.auth_url.clone())
            .with_headers(headers)
            .with_body(Bytes::from(form));
        if let Some(timeout) = self.timeout {
            request = request.with_timeout(timeout);
        }

        tracing::debug!(
            grant_type = grant.grant_type,
            url = %self.auth_url,
            "Requesting OAuth grant"
        );

        let response = self.retry.send(self.transport.as_ref(), request).await?;
        if response.status != StatusCode::OK {
            self.record_rejection(username, grant.grant_type, &response).await;
        }
        parse_grant_response(response)
    }

    /// Secrets never reach the sink: the request body is reduced to the grant type.
    async fn record_rejection(&self, username: &str, grant_type: &str, response: &HttpResponse) {
        let Some(sink) = &self.diagnostics else {
            return;
        };

        sink.record(&DiagnosticRecord {
            username: username.to_string(),
            method: HttpMethod::Post,
            url: self.auth_url.to_string(),
            status: response.status.as_u16(),
            response_body: String::from_utf8_lossy(&response.body).to_string(),
            request_body: Some(format!("grant_type={}", grant_type)),
        })
        .await;
    }
}

fn parse_grant_response(response: HttpResponse) -> MailUpResult<TokenPair> {
    if response.status != StatusCode::OK {
        let description = error_description(&response.body);
        tracing::warn!(
            status = response.status.as_u16(),
            description = %description,
            "OAuth grant rejected"
        );
        return Err(AuthenticationError::GrantRejected {
            status: response.status.as_u16(),
            description,
        }
        .into());
    }

    let body: GrantResponse = serde_json::from_slice(&response.body).map_err(|e| {
        AuthenticationError::MalformedTokenResponse(format!("Failed to parse response: {}", e))
    })?;

    match (body.access_token, body.refresh_token) {
        (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
            Ok(TokenPair::new(access, refresh))
        }
        _ => Err(AuthenticationError::MalformedTokenResponse(
            "access_token and refresh_token are both required".to_string(),
        )
        .into()),
    }
}
