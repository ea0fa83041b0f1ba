//! Rate-limit back-off for the MailUp API.
//!
//! MailUp answers `429 Too Many Requests` when a console exceeds its request
//! quota. Every send, including OAuth grants, goes through [`RateLimitRetry`]
//! so a 429 is resent after a bounded, growing delay instead of immediately.

use crate::errors::TransportError;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use reqwest::StatusCode;
use std::time::Duration;

/// Retry configuration for exponential backoff on 429 responses.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of sends for one request, including the first.
    pub max_attempts: u32,
    /// Shortest delay before any resend, including `Retry-After: 0`.
    pub min_backoff: Duration,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Multiplier for exponential backoff.
    pub multiplier: f64,
    /// Whether to add jitter to backoff.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            min_backoff: Duration::from_millis(500),
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Returns a config that never resends.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Resends rate-limited requests with exponential backoff.
#[derive(Debug, Clone)]
pub struct RateLimitRetry {
    config: RetryConfig,
}

impl RateLimitRetry {
    /// Creates a new rate-limit retry policy.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Sends `request`, resending while the server answers 429.
    ///
    /// Returns the first non-429 response, or the last 429 once
    /// `max_attempts` sends are spent. Transport failures are returned as-is
    /// and are never resent.
    pub async fn send(
        &self,
        transport: &dyn HttpTransport,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let response = transport.send(request.clone()).await?;

            if response.status != StatusCode::TOO_MANY_REQUESTS || attempt >= max_attempts {
                return Ok(response);
            }

            let delay = response
                .retry_after()
                .unwrap_or_else(|| calculate_backoff(attempt, &self.config))
                .max(self.config.min_backoff)
                .min(self.config.max_backoff.max(self.config.min_backoff));

            tracing::warn!(
                attempt = attempt,
                max_attempts = max_attempts,
                delay_ms = delay.as_millis() as u64,
                method = %request.method,
                url = %request.url,
                "Rate limited, backing off"
            );

            tokio::time::sleep(delay).await;
        }
    }
}

/// Calculates backoff duration for a retry attempt (1-based).
///
/// A non-finite or negative product falls back to `max_backoff`.
pub fn calculate_backoff(attempt: u32, config: &RetryConfig) -> Duration {
    let base = config.initial_backoff.as_secs_f64();
    let exp = config.multiplier.powi(attempt.saturating_sub(1) as i32);
    let mut delay = base * exp;

    let max = config.max_backoff.as_secs_f64();
    if !delay.is_finite() || delay < 0.0 || delay > max {
        delay = max;
    }

    if config.jitter && delay > 0.0 {
        use rand::Rng;
        let jitter = rand::thread_rng().gen_range(0.0..=delay * 0.1);
        delay += jitter;
    }

    Duration::from_secs_f64(delay)
}
