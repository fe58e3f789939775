//! HTTP middleware for the Books API client.

use crate::utils::fmt_duration;
use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Logs every outbound request with its status and latency.
pub struct TransactionLogger;

#[async_trait::async_trait]
impl Middleware for TransactionLogger {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let method = req.method().clone();
        let url = req.url().clone();
        let start = Instant::now();

        let result = next.run(req, extensions).await;
        let duration = fmt_duration(start.elapsed());

        match &result {
            Ok(response) if response.status().is_success() => {
                debug!(method = %method, url = %url, status = response.status().as_u16(), duration, "Books API response");
            }
            Ok(response) => {
                warn!(method = %method, url = %url, status = response.status().as_u16(), duration, "Books API error status");
            }
            Err(e) => {
                warn!(method = %method, url = %url, error = %e, duration, "Books API request failed");
            }
        }

        result
    }
}

/// Longest single wait between retries.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Retries transport failures and 5xx responses with capped exponential backoff.
pub struct RetryTransient {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryTransient {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(200),
        }
    }

    /// Wait before retry number `attempt + 1`.
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_RETRY_DELAY)
    }

    fn is_transient(result: &Result<Response>) -> bool {
        match result {
            Ok(response) => response.status().is_server_error(),
            Err(reqwest_middleware::Error::Reqwest(e)) => e.is_connect() || e.is_timeout(),
            Err(_) => false,
        }
    }
}

#[async_trait::async_trait]
impl Middleware for RetryTransient {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let mut attempt = 0;
        loop {
            // Streaming bodies cannot be replayed; send those once.
            let Some(attempt_req) = req.try_clone() else {
                return next.run(req, extensions).await;
            };

            let result = next.clone().run(attempt_req, extensions).await;
            if attempt >= self.max_retries || !Self::is_transient(&result) {
                return result;
            }

            let delay = self.backoff(attempt);
            attempt += 1;
            debug!(
                attempt,
                max_retries = self.max_retries,
                delay = fmt_duration(delay),
                "retrying Books API request"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
