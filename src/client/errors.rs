//! API client error types
//!
//! Structured error handling for the request pipeline.
//! Separates transient transport failures (retried) from logical failures
//! such as non-success HTTP statuses (never retried).

use std::time::Duration;

/// Pipeline phase an interceptor ran in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptorPhase {
    Request,
    Response,
}

impl std::fmt::Display for InterceptorPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterceptorPhase::Request => f.write_str("request"),
            InterceptorPhase::Response => f.write_str("response"),
        }
    }
}

/// Coarse classification of an [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    Transport,
    RetryExhausted,
    HttpStatus,
    Interceptor,
    Decode,
    Serialize,
    InvalidEndpoint,
}

/// API client error types
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Retries exhausted after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<ApiError>,
    },

    #[error("HTTP Error: {status}")]
    HttpStatus { status: u16, status_text: String },

    #[error("{phase} interceptor failed: {source}")]
    Interceptor {
        phase: InterceptorPhase,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to decode response body: {0}")]
    Decode(String),

    #[error("Failed to encode request body: {0}")]
    Serialize(String),

    #[error("Invalid endpoint: {0:?}")]
    InvalidEndpoint(String),
}

impl ApiError {
    /// Error kind without the payload
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Timeout(_) => ErrorKind::Timeout,
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::RetryExhausted { .. } => ErrorKind::RetryExhausted,
            ApiError::HttpStatus { .. } => ErrorKind::HttpStatus,
            ApiError::Interceptor { .. } => ErrorKind::Interceptor,
            ApiError::Decode(_) => ErrorKind::Decode,
            ApiError::Serialize(_) => ErrorKind::Serialize,
            ApiError::InvalidEndpoint(_) => ErrorKind::InvalidEndpoint,
        }
    }

    /// Whether this error prevented the call from completing and may be retried
    ///
    /// A response carrying an error status did complete, so it is not retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Timeout(_) | ApiError::Transport(_))
    }

    /// HTTP status for [`ApiError::HttpStatus`]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Create an error from a completed response with a non-success status
    pub fn from_status(status: u16, status_text: &str) -> Self {
        ApiError::HttpStatus {
            status,
            status_text: status_text.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
