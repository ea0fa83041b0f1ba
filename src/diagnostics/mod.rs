//! Diagnostic sinks for failed requests.
//!
//! The executor hands every response with a status of 400 or above to the
//! configured [`DiagnosticSink`] before returning the error to the caller,
//! and the authenticator does the same for rejected OAuth grants.
//! Sinks are best-effort: they cannot fail the request path.

use crate::transport::HttpMethod;
use async_trait::async_trait;
use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Default file written by [`FileSink`].
pub const DEFAULT_ERROR_LOG: &str = "mailup_error.log";

/// Everything known about one failed request.
#[derive(Debug, Clone)]
pub struct DiagnosticRecord {
    /// Console user the client is logged in as.
    pub username: String,
    /// Request method.
    pub method: HttpMethod,
    /// Full request URL.
    pub url: String,
    /// Response status code.
    pub status: u16,
    /// Response body, lossily decoded.
    pub response_body: String,
    /// Request body, if any.
    pub request_body: Option<String>,
}

/// Receiver of failed-request diagnostics.
#[async_trait]
pub trait DiagnosticSink: Send + Sync {
    /// Records a failed request. Must not panic, and failures are swallowed.
    async fn record(&self, record: &DiagnosticRecord);
}

/// Emits each failure as a structured `tracing` error event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

#[async_trait]
impl DiagnosticSink for TracingSink {
    async fn record(&self, record: &DiagnosticRecord) {
        tracing::error!(
            username = %record.username,
            method = %record.method,
            url = %record.url,
            status = record.status,
            response = %record.response_body,
            request_body = record.request_body.as_deref().unwrap_or(""),
            "MailUp request failed"
        );
    }
}

/// Appends a human-readable block per failure to a log file.
pub struct FileSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSink {
    /// Creates a sink appending to `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn render(record: &DiagnosticRecord) -> String {
        let time = Local::now().format("%H:%M:%S %d-%m-%Y");
        let response = if record.response_body.trim().is_empty() {
            "NONE"
        } else {
            record.response_body.as_str()
        };

        let mut block = format!(
            "    =======================>  {}  <=======================\n",
            time
        );
        block.push_str(&format!("[MAILUP USER]: {}\n[URL]: {}\n", record.username, record.url));
        block.push_str(&format!("[REQUEST]:\ntype =====> {}\n", record.method));
        if let Some(body) = &record.request_body {
            block.push_str(&format!("data =====> {}\n", body));
        }
        block.push_str(&format!("[RESPONSE]:\nstatus =====> {}\n", record.status));
        block.push_str(&format!("error =====> {}\n\n", response));
        block
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_LOG)
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink").field("path", &self.path).finish()
    }
}

impl FileSink {
    async fn append(&self, block: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(block.as_bytes()).await?;
        file.flush().await
    }
}

#[async_trait]
impl DiagnosticSink for FileSink {
    async fn record(&self, record: &DiagnosticRecord) {
        let block = Self::render(record);
        // Keeps concurrent blocks from interleaving.
        let _guard = self.lock.lock().await;

        if let Err(e) = self.append(&block).await {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to write error log");
        }
    }
}
