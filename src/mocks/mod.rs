//! Mock transport for unit tests.

use crate::errors::TransportError;
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Scripted outcome of one send.
pub enum MockResponse {
    /// A response with the given status, headers and body.
    Reply(HttpResponse),
    /// A transport failure.
    Failure(TransportError),
}

impl MockResponse {
    /// A JSON response.
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        MockResponse::Reply(HttpResponse::new(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            Bytes::from(body.to_string()),
        ))
    }

    /// An empty-bodied response.
    pub fn status(status: u16) -> Self {
        MockResponse::Reply(HttpResponse::new(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            Bytes::new(),
        ))
    }

    /// A successful token grant.
    pub fn tokens(access: &str, refresh: &str) -> Self {
        Self::json(
            200,
            serde_json::json!({
                "access_token": access,
                "refresh_token": refresh,
                "expires_in": 900,
            }),
        )
    }

    /// One listing page envelope.
    pub fn page(total: u64, page_size: u64, items: Vec<serde_json::Value>) -> Self {
        Self::json(
            200,
            serde_json::json!({
                "IsPaginated": true,
                "Items": items,
                "PageNumber": 0,
                "PageSize": page_size,
                "Skipped": 0,
                "TotalElementsCount": total,
            }),
        )
    }

    /// A transport failure.
    pub fn failure(err: TransportError) -> Self {
        MockResponse::Failure(err)
    }

    /// Adds a header to a scripted reply.
    pub fn with_header(self, key: &'static str, value: &'static str) -> Self {
        match self {
            MockResponse::Reply(mut response) => {
                response.headers.insert(key, HeaderValue::from_static(value));
                MockResponse::Reply(response)
            }
            failure => failure,
        }
    }
}

/// Recorded request for verification.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Full request URL.
    pub url: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body as text.
    pub body: Option<String>,
}

impl RecordedRequest {
    /// Returns a header value as a string.
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

/// Transport replaying a queue of scripted responses.
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    /// Creates an empty mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a scripted response.
    pub fn push(&self, response: MockResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Returns every request sent so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Returns the number of requests sent so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method,
            url: request.url.to_string(),
            headers: request.headers.clone(),
            body: request
                .body
                .as_ref()
                .map(|b| String::from_utf8_lossy(b).to_string()),
        });

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(MockResponse::Reply(response)) => Ok(response),
            Some(MockResponse::Failure(err)) => Err(err),
            None => Err(TransportError::Http(format!(
                "no scripted response for {} {}",
                request.method, request.url
            ))),
        }
    }
}

/// Base URL used by the executor built in [`executor`].
pub const BASE_URL: &str = "https://services.mailup.com/Console";

/// An executor over `transport` already holding a token pair.
pub async fn executor(transport: &MockTransport) -> Arc<crate::client::RequestExecutor> {
    let config = crate::config::MailUpConfig::builder()
        .credentials(crate::auth::Credentials::new(
            "username",
            "password",
            "client-id",
            "client-secret",
        ))
        .base_url(BASE_URL)
        .build()
        .unwrap();

    let executor = crate::client::RequestExecutor::new(config, Arc::new(transport.clone()));
    executor
        .set_tokens(crate::auth::TokenPair::new("token", "refresh"))
        .await;
    Arc::new(executor)
}
