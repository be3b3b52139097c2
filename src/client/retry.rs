//! Retry policy with linear backoff
//!
//! Only failures that prevented the call from completing (timeouts, network
//! errors) are retried. A response with an error status is returned as-is.

use std::time::Duration;
use tracing::{debug, warn};

use super::errors::ApiError;
use super::transport::{call_with_deadline, Transport};
use super::types::{RawResponse, RequestOptions};
use crate::config::ClientConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Deadline applied to every attempt
    pub timeout: Duration,
    log_attempts: bool,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, timeout: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            timeout,
            log_attempts: false,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            log_attempts: config.enable_logging,
            ..Self::new(config.max_retries, config.retry_base_delay, config.timeout)
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Call the transport until it completes or the retry budget is spent
    ///
    /// Makes at most `max_retries + 1` attempts. The last failure is wrapped in
    /// [`ApiError::RetryExhausted`].
    pub async fn execute(
        &self,
        transport: &dyn Transport,
        url: &str,
        options: &RequestOptions,
    ) -> Result<RawResponse, ApiError> {
        let mut retries = 0;

        loop {
            let err = match call_with_deadline(transport, url, options, self.timeout).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            if retries >= self.max_retries {
                debug!(url = url, attempts = retries + 1, error = %err, "Retry budget exhausted");
                return Err(ApiError::RetryExhausted {
                    attempts: retries + 1,
                    source: Box::new(err),
                });
            }

            retries += 1;
            let delay = self.delay_for(retries);
            if self.log_attempts {
                warn!(
                    url = url,
                    attempt = retries,
                    max = self.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying request"
                );
            }
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}
