//! Authentication for the MailUp API.
//!
//! MailUp issues OAuth2 bearer tokens through the resource-owner password
//! grant and renews them with the refresh grant. This module holds:
//! - [`Credentials`]: the console user and the developer application keys
//! - [`TokenStore`]: the current access/refresh pair and the headers derived from it
//! - [`Authenticator`]: the password and refresh grants against the OAuth endpoint
//!
//! # Example
//!
//! ```no_run
//! use integrations_mailup::auth::{Authenticator, Credentials, TokenStore};
//! use integrations_mailup::resilience::RetryConfig;
//! use integrations_mailup::transport::ReqwestTransport;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new("m12345", "password", "client-id", "client-secret");
//! let transport = Arc::new(ReqwestTransport::with_connect_timeout(Duration::from_secs(10))?);
//! let authenticator = Authenticator::new(
//!     transport,
//!     integrations_mailup::config::DEFAULT_AUTH_URL.parse()?,
//!     RetryConfig::default(),
//! );
//!
//! let mut store = TokenStore::new();
//! store.set(authenticator.login(&credentials).await?);
//! assert!(store.is_authenticated());
//! # Ok(())
//! # }
//! ```

mod authenticator;

pub use authenticator::Authenticator;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};

/// MailUp console credentials and developer application keys.
#[derive(Clone, Debug)]
pub struct Credentials {
    /// Console username (for example `m12345`).
    pub username: String,
    /// Console password.
    pub password: SecretString,
    /// Developer application client id.
    pub client_id: String,
    /// Developer application client secret.
    pub client_secret: SecretString,
}

impl Credentials {
    /// Creates credentials from plain strings.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into()),
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
        }
    }
}

/// An access token together with the refresh token issued alongside it.
#[derive(Clone, Debug)]
pub struct TokenPair {
    /// Bearer token sent with every resource request.
    pub access_token: SecretString,
    /// Token exchanged for a new pair once the access token is rejected.
    pub refresh_token: SecretString,
}

impl TokenPair {
    /// Creates a token pair from plain strings.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            refresh_token: SecretString::new(refresh_token.into()),
        }
    }
}

/// In-memory holder of the current token pair.
///
/// Holds either no tokens or a complete pair; tokens are only ever replaced
/// together.
#[derive(Clone, Debug, Default)]
pub struct TokenStore {
    tokens: Option<TokenPair>,
}

impl TokenStore {
    /// Creates an empty (unauthenticated) store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces both tokens.
    pub fn set(&mut self, tokens: TokenPair) {
        self.tokens = Some(tokens);
    }

    /// Forgets both tokens.
    pub fn clear(&mut self) {
        self.tokens = None;
    }

    /// Returns true if a token pair is held.
    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_some()
    }

    /// Current access token.
    pub fn access_token(&self) -> Option<&SecretString> {
        self.tokens.as_ref().map(|t| &t.access_token)
    }

    /// Current refresh token.
    pub fn refresh_token(&self) -> Option<&SecretString> {
        self.tokens.as_ref().map(|t| &t.refresh_token)
    }

    /// Headers for a resource request.
    ///
    /// Always carries `Content-Type: application/json`; carries
    /// `Authorization: Bearer <access>` only once a token is set.
    pub fn auth_header(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = self.access_token() {
            match HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => {
                    tracing::warn!("Access token is not a valid header value, sending without it");
                }
            }
        }

        headers
    }

    /// Returns true if the held access token equals `token`.
    pub(crate) fn holds_access_token(&self, token: Option<&str>) -> bool {
        self.access_token().map(|t| t.expose_secret().as_str()) == token
    }
}
