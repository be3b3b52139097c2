//! Resilient JSON HTTP client
//!
//! Wraps a resource-oriented JSON API with per-attempt timeouts, linear-backoff
//! retries, request/response interceptors and a TTL response cache that is
//! purged when the same resource family is mutated.

pub mod cache;
pub mod client;
pub mod config;

pub use cache::{CacheEntryStats, CacheStats, ResponseCache};
pub use client::{
    request_fn, response_fn, ApiClient, ApiError, ApiResponse, ErrorKind, Method, RawResponse,
    ReadOptions, RequestInterceptor, RequestOptions, ResponseAction, ResponseInterceptor,
    Transport,
};
pub use config::ClientConfig;
