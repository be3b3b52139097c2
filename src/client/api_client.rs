//! API client facade
//!
//! Composes the response cache, interceptor chain, retry policy and transport
//! into the four verb operations.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use super::errors::ApiError;
use super::interceptors::{InterceptorChain, RequestInterceptor, ResponseInterceptor};
use super::retry::RetryPolicy;
use super::transport::{ReqwestTransport, Transport};
use super::types::{join_url, resource_family, ApiResponse, Method, ReadOptions, RequestOptions};
use crate::cache::{CacheStats, ResponseCache};
use crate::config::ClientConfig;

/// Resilient JSON API client
///
/// Interceptors are registered with `&mut self` before the client is shared;
/// every request operation takes `&self`, so one instance can serve many
/// concurrent callers (wrap it in an `Arc`).
pub struct ApiClient {
    base_url: String,
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    interceptors: InterceptorChain,
    cache: ResponseCache,
}

impl ApiClient {
    /// Create a client that talks HTTP through reqwest
    pub fn new(base_url: impl Into<String>, config: ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(base_url, config, Arc::new(transport)))
    }

    /// Create a client over a custom transport
    pub fn with_transport(
        base_url: impl Into<String>,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let base_url = base_url.into();
        let retry = RetryPolicy::from_config(&config);
        let cache = ResponseCache::new(config.cache_ttl, config.enable_cache);

        debug!(
            base_url = %base_url,
            timeout_ms = config.timeout.as_millis() as u64,
            max_retries = config.max_retries,
            cache = config.enable_cache,
            "API client ready"
        );

        Self {
            base_url,
            config,
            transport,
            retry,
            interceptors: InterceptorChain::new(),
            cache,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn add_request_interceptor<I: RequestInterceptor + 'static>(&mut self, interceptor: I) {
        self.interceptors.add_request(interceptor);
    }

    pub fn add_response_interceptor<I: ResponseInterceptor + 'static>(&mut self, interceptor: I) {
        self.interceptors.add_response(interceptor);
    }

    /// Read a resource, serving from cache when a live entry exists
    pub async fn get(&self, endpoint: &str) -> Result<ApiResponse, ApiError> {
        self.get_with(endpoint, ReadOptions::default()).await
    }

    pub async fn get_with(
        &self,
        endpoint: &str,
        read: ReadOptions,
    ) -> Result<ApiResponse, ApiError> {
        let mut options = RequestOptions::new(Method::Get);
        options.force_refresh = read.force_refresh;
        self.request(endpoint, options).await
    }

    /// Create a resource with a JSON body
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &T,
    ) -> Result<ApiResponse, ApiError> {
        let options = RequestOptions::new(Method::Post).with_json_body(payload)?;
        self.request(endpoint, options).await
    }

    /// Replace a resource with a JSON body
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &T,
    ) -> Result<ApiResponse, ApiError> {
        let options = RequestOptions::new(Method::Put).with_json_body(payload)?;
        self.request(endpoint, options).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<ApiResponse, ApiError> {
        self.request(endpoint, RequestOptions::new(Method::Delete)).await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        if self.config.enable_logging {
            info!("Cache cleared");
        }
    }

    /// Run one request through the full pipeline
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let url = join_url(&self.base_url, endpoint)?;
        let started = Instant::now();

        let result = self.execute(endpoint, &url, options, started).await;

        if let Err(e) = &result {
            if self.config.enable_logging {
                error!(
                    url = %url,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    kind = ?e.kind(),
                    error = %e,
                    "Request failed"
                );
            }
        }
        result
    }

    async fn execute(
        &self,
        endpoint: &str,
        url: &str,
        options: RequestOptions,
        started: Instant,
    ) -> Result<ApiResponse, ApiError> {
        let method = options.method;
        let cache_key = ResponseCache::key(method, url);
        let logging = self.config.enable_logging;

        if method == Method::Get && !options.force_refresh && self.cache.is_enabled() {
            if let Some(data) = self.cache.get(&cache_key) {
                if logging {
                    info!(url = url, "Cache HIT");
                }
                return Ok(ApiResponse::cached(data));
            }
            if logging {
                info!(url = url, "Cache MISS");
            }
        }

        let options = self.interceptors.apply_request(url, &options).await?;
        if logging {
            info!(
                method = %options.method,
                url = url,
                headers = ?options.headers,
                "Request"
            );
        }

        let response = self
            .retry
            .execute(self.transport.as_ref(), url, &options)
            .await?;

        if !response.is_success() {
            return Err(ApiError::from_status(response.status, &response.status_text));
        }

        let data = response.json()?;
        let data = self.interceptors.apply_response(&response, data).await?;

        if method == Method::Get {
            self.cache.insert(&cache_key, data.clone());
        }

        if method.is_mutation() {
            let family = resource_family(endpoint);
            let removed = self.cache.invalidate(family);
            if logging {
                info!(pattern = family, removed = removed, "Invalidated cache");
            }
        }

        if logging {
            info!(
                status = response.status,
                url = url,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Response"
            );
        }

        Ok(ApiResponse::fresh(data))
    }
}
