//! Error types for the MailUp integration.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Result type for MailUp operations.
pub type MailUpResult<T> = Result<T, MailUpError>;

/// Fallback description when the server body names no error.
pub const GENERIC_ERROR_DESCRIPTION: &str = "no error description provided";

/// Top-level error type for the MailUp integration.
#[derive(Debug, Error)]
pub enum MailUpError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Login, refresh, or a retried call that was still unauthorized.
    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    /// The API answered with a status of 400 or above.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// No response was obtained from the server.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A success response could not be decoded.
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),
}

impl MailUpError {
    /// Creates a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        MailUpError::Configuration(ConfigurationError::InvalidConfiguration(msg.into()))
    }

    /// Creates a deserialization error.
    pub fn deserialization(msg: impl Into<String>) -> Self {
        MailUpError::Response(ResponseError::Deserialization(msg.into()))
    }

    /// Returns true if the error is worth retrying by the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            MailUpError::Api(err) => err.status_code == StatusCode::TOO_MANY_REQUESTS.as_u16(),
            MailUpError::Transport(TransportError::Timeout(_))
            | MailUpError::Transport(TransportError::Network(_)) => true,
            _ => false,
        }
    }

    /// Returns the HTTP status code if the error came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            MailUpError::Api(err) => Some(err.status_code),
            MailUpError::Authentication(AuthenticationError::GrantRejected { status, .. }) => {
                Some(*status)
            }
            MailUpError::Authentication(AuthenticationError::Unauthorized(_)) => {
                Some(StatusCode::UNAUTHORIZED.as_u16())
            }
            _ => None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Missing credentials.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// The OAuth endpoint refused a password or refresh grant.
    #[error("Error {status} - {description}")]
    GrantRejected {
        /// HTTP status returned by the OAuth endpoint.
        status: u16,
        /// Server-provided error description.
        description: String,
    },

    /// The OAuth endpoint answered 200 without a usable token pair.
    #[error("Malformed token response: {0}")]
    MalformedTokenResponse(String),

    /// The call was still unauthorized after a token refresh.
    #[error("Unauthorized after token refresh: {0}")]
    Unauthorized(String),
}

/// An API response with a status of 400 or above.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Error {status_code} - {description}")]
pub struct ApiError {
    /// HTTP status code.
    pub status_code: u16,
    /// Server-provided error description.
    pub description: String,
}

impl ApiError {
    /// Builds an API error from a status and a raw response body.
    pub fn from_body(status_code: u16, body: &[u8]) -> Self {
        Self {
            status_code,
            description: error_description(body),
        }
    }
}

/// Response errors.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout error.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Protocol-level failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The request URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Network(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

/// Extracts the server's error description from a response body.
///
/// MailUp resource endpoints use `ErrorDescription`, the OAuth endpoint uses
/// `error_description`. Falls back to [`GENERIC_ERROR_DESCRIPTION`].
pub fn error_description(body: &[u8]) -> String {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();

    parsed
        .as_ref()
        .and_then(|v| {
            ["ErrorDescription", "error_description"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str))
        })
        .map(str::to_string)
        .unwrap_or_else(|| GENERIC_ERROR_DESCRIPTION.to_string())
}
