//! HTTP transport
//!
//! One network call per invocation. No retries, no caching and no
//! interpretation of status codes; those belong to the layers above.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::errors::ApiError;
use super::types::{RawResponse, RequestOptions};

/// A single network call
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one request and return the response whatever its status.
    ///
    /// `cancel` fires when the caller's deadline elapses; the call should stop
    /// and return promptly once it does.
    async fn call(
        &self,
        url: &str,
        options: &RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, ApiError>;
}

/// Cancellation token paired with the instant it should fire
///
/// Owned by the caller and driven by [`Deadline::elapsed`]; nothing runs in
/// the background.
pub struct Deadline {
    token: CancellationToken,
    expires_at: Instant,
}

impl Deadline {
    /// Fix the expiry instant `timeout` from now
    pub fn arm(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            expires_at: Instant::now() + timeout,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn has_expired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for the expiry instant, then cancel the token
    pub async fn elapsed(&self) {
        sleep_until(self.expires_at).await;
        self.token.cancel();
    }
}

/// Run one transport call bounded by `timeout`
///
/// The in-flight call is dropped when the deadline fires, and any failure
/// after that point surfaces as [`ApiError::Timeout`].
pub async fn call_with_deadline(
    transport: &dyn Transport,
    url: &str,
    options: &RequestOptions,
    timeout: Duration,
) -> Result<RawResponse, ApiError> {
    let deadline = Deadline::arm(timeout);

    let result = tokio::select! {
        biased;
        result = transport.call(url, options, deadline.token()) => result,
        _ = deadline.elapsed() => Err(ApiError::Timeout(timeout)),
    };

    match result {
        Err(_) if deadline.has_expired() => {
            trace!(url = url, timeout_ms = timeout.as_millis() as u64, "Transport call aborted");
            Err(ApiError::Timeout(timeout))
        }
        other => other,
    }
}

/// Transport backed by a shared reqwest client
#[derive(Clone)]
pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ApiError> {
        let http_client = Client::builder()
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http_client })
    }

    /// Wrap an existing client (connection pool, proxies, TLS settings)
    pub fn with_client(http_client: Client) -> Self {
        Self { http_client }
    }

    async fn send(&self, url: &str, options: &RequestOptions) -> Result<RawResponse, ApiError> {
        let mut request = self.http_client.request(options.method.into(), url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        let response = request.send().await?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn call(
        &self,
        url: &str,
        options: &RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, ApiError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(ApiError::Transport("Request aborted".to_string())),
            result = self.send(url, options) => result,
        }
    }
}
