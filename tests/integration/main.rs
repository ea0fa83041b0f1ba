//! Integration tests using WireMock
//!
//! These tests run the whole client against a mock MailUp server: OAuth
//! grants, token refresh, rate limits, pagination and the resource services.

mod auth;
mod services;

use integrations_mailup::prelude::*;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path of the OAuth endpoint on the mock server.
pub const TOKEN_PATH: &str = "/Authorization/OAuth/Token";

/// Path prefix of Console resources on the mock server.
pub const CONSOLE: &str = "/Console";

/// Back-off short enough to keep tests fast.
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        min_backoff: Duration::from_millis(1),
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(10),
        multiplier: 2.0,
        jitter: false,
    }
}

/// Builder for a client pointing at the mock server.
pub fn client_builder(server: &MockServer) -> MailUpClientBuilder {
    MailUpClient::builder()
        .credentials(Credentials::new(
            "m12345",
            "password",
            "client-id",
            "client-secret",
        ))
        .base_url(format!("{}{}", server.uri(), CONSOLE))
        .auth_url(format!("{}{}", server.uri(), TOKEN_PATH))
        .retry(fast_retry())
}

/// Client pointing at the mock server, not yet logged in.
pub fn client(server: &MockServer) -> MailUpClient {
    client_builder(server).build().expect("Failed to build client")
}

/// Mounts a password grant answering with the given tokens.
pub async fn mount_login(server: &MockServer, access: &str, refresh: &str) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=password"))
        .respond_with(tokens(access, refresh))
        .mount(server)
        .await;
}

/// A successful grant response.
pub fn tokens(access: &str, refresh: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": 900
    }))
}

/// A listing page envelope.
pub fn page(total: u64, page_size: u64, items: Vec<serde_json::Value>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "IsPaginated": true,
        "Items": items,
        "PageSize": page_size,
        "Skipped": 0,
        "TotalElementsCount": total
    }))
}

/// Console path for a relative resource path.
pub fn console(resource: &str) -> String {
    format!("{}/{}", CONSOLE, resource)
}

/// Logged-in client.
pub async fn logged_in(server: &MockServer) -> MailUpClient {
    mount_login(server, "access-1", "refresh-1").await;
    let client = client(server);
    client.login().await.expect("login failed");
    client
}
