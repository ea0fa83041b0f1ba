//! Integration tests for login, token refresh and rate limits

use super::*;
use integrations_mailup::diagnostics::FileSink;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_sends_password_grant() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=m12345"))
        .and(body_string_contains("client_id=client-id"))
        .and(body_string_contains("client_secret=client-secret"))
        .respond_with(tokens("access-1", "refresh-1"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.login().await.unwrap();

    let store = client.executor().token_store().await;
    assert!(store.is_authenticated());
    let headers = store.auth_header();
    assert_eq!(headers.get("authorization").unwrap(), "Bearer access-1");
}

#[tokio::test]
async fn test_login_invalid_client() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"ErrorDescription": "invalid_client"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).login().await.unwrap_err();

    assert!(matches!(
        err,
        MailUpError::Authentication(AuthenticationError::GrantRejected { status: 400, .. })
    ));
    assert!(err.to_string().contains("invalid_client"));
}

#[tokio::test]
async fn test_connect_logs_in() {
    let server = MockServer::start().await;
    mount_login(&server, "access-1", "refresh-1").await;

    let config = MailUpConfig::builder()
        .credentials(Credentials::new("m12345", "password", "client-id", "client-secret"))
        .base_url(format!("{}{}", server.uri(), CONSOLE))
        .auth_url(format!("{}{}", server.uri(), TOKEN_PATH))
        .build()
        .unwrap();

    let client = MailUpClient::connect(config).await.unwrap();
    assert!(client.is_authenticated().await);
}

#[tokio::test]
async fn test_expired_token_is_refreshed_once() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(tokens("access-2", "refresh-2"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(console("List/1/Groups")))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(console("List/1/Groups")))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(page(1, 20, vec![json!({"idGroup": 3, "Name": "vip"})]))
        .expect(1)
        .mount(&server)
        .await;

    let groups = client.lists().groups(1).await.unwrap();
    assert_eq!(groups.items[0]["Name"], "vip");

    let store = client.executor().token_store().await;
    assert_eq!(
        store.auth_header().get("authorization").unwrap(),
        "Bearer access-2"
    );
}

#[tokio::test]
async fn test_second_unauthorized_does_not_refresh_again() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(tokens("access-2", "refresh-2"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(console("List/1/Groups")))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"ErrorDescription": "Unauthorized"})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let err = client.lists().groups(1).await.unwrap_err();
    assert!(matches!(
        err,
        MailUpError::Authentication(AuthenticationError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_rate_limited_request_is_resent() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("POST"))
        .and(path(console("Email/Send")))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(console("Email/Send")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.messages().send("a@example.com", 42).await.unwrap());
}

#[tokio::test]
async fn test_rate_limit_exhausted() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("POST"))
        .and(path(console("Email/Send")))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let err = client.messages().send("a@example.com", 42).await.unwrap_err();
    assert_eq!(err.status_code(), Some(429));
}

#[tokio::test]
async fn test_failed_request_is_written_to_error_log() {
    let server = MockServer::start().await;
    mount_login(&server, "access-1", "refresh-1").await;

    let log = std::env::temp_dir().join(format!("mailup_it_{}.log", std::process::id()));
    let _ = std::fs::remove_file(&log);

    let client = client_builder(&server)
        .diagnostics(FileSink::new(&log))
        .build()
        .unwrap();
    client.login().await.unwrap();

    Mock::given(method("DELETE"))
        .and(path(console("List/2/Recipient/5")))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"ErrorDescription": "Recipient not found"})),
        )
        .mount(&server)
        .await;

    let err = client
        .lists()
        .remove_recipient(ListScope::List(2), 5)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Error 404 - Recipient not found");

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains("[MAILUP USER]: m12345"));
    assert!(contents.contains("type =====> DELETE"));
    assert!(contents.contains("status =====> 404"));
    assert!(contents.contains("Recipient not found"));

    let _ = std::fs::remove_file(&log);
}

#[tokio::test]
async fn test_rejected_login_is_written_to_error_log() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"ErrorDescription": "invalid_client"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let log = std::env::temp_dir().join(format!("mailup_it_grant_{}.log", std::process::id()));
    let _ = std::fs::remove_file(&log);

    let client = client_builder(&server)
        .diagnostics(FileSink::new(&log))
        .build()
        .unwrap();
    client.login().await.unwrap_err();

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains("[MAILUP USER]: m12345"));
    assert!(contents.contains("data =====> grant_type=password"));
    assert!(contents.contains("status =====> 400"));
    assert!(contents.contains("invalid_client"));
    assert!(!contents.contains("client-secret"));

    let _ = std::fs::remove_file(&log);
}
