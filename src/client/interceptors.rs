//! Request and response interceptors
//!
//! Two independently ordered pipelines. Each step sees the cumulative result
//! of the steps registered before it.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::errors::{ApiError, InterceptorPhase};
use super::types::{RawResponse, RequestOptions};

/// Outcome of a response interceptor
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseAction {
    /// Replace the payload, even with `null`
    Replace(Value),
    /// Leave the payload as it is
    Keep,
}

/// Transformation applied to outgoing request options
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Return `Some` to replace the options, `None` to leave them unchanged.
    async fn on_request(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> anyhow::Result<Option<RequestOptions>>;
}

/// Transformation applied to a decoded response payload
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    async fn on_response(&self, response: &RawResponse, data: &Value)
        -> anyhow::Result<ResponseAction>;
}

/// Request interceptor from a synchronous closure, see [`request_fn`]
pub struct RequestFn<F>(F);

/// Response interceptor from a synchronous closure, see [`response_fn`]
pub struct ResponseFn<F>(F);

pub fn request_fn<F>(f: F) -> RequestFn<F>
where
    F: Fn(&str, &RequestOptions) -> anyhow::Result<Option<RequestOptions>> + Send + Sync,
{
    RequestFn(f)
}

pub fn response_fn<F>(f: F) -> ResponseFn<F>
where
    F: Fn(&RawResponse, &Value) -> anyhow::Result<ResponseAction> + Send + Sync,
{
    ResponseFn(f)
}

#[async_trait]
impl<F> RequestInterceptor for RequestFn<F>
where
    F: Fn(&str, &RequestOptions) -> anyhow::Result<Option<RequestOptions>> + Send + Sync,
{
    async fn on_request(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> anyhow::Result<Option<RequestOptions>> {
        (self.0)(url, options)
    }
}

#[async_trait]
impl<F> ResponseInterceptor for ResponseFn<F>
where
    F: Fn(&RawResponse, &Value) -> anyhow::Result<ResponseAction> + Send + Sync,
{
    async fn on_response(
        &self,
        response: &RawResponse,
        data: &Value,
    ) -> anyhow::Result<ResponseAction> {
        (self.0)(response, data)
    }
}

/// Ordered, append-only interceptor pipelines
#[derive(Clone, Default)]
pub struct InterceptorChain {
    request: Vec<Arc<dyn RequestInterceptor>>,
    response: Vec<Arc<dyn ResponseInterceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_request<I: RequestInterceptor + 'static>(&mut self, interceptor: I) {
        self.request.push(Arc::new(interceptor));
    }

    pub fn add_response<I: ResponseInterceptor + 'static>(&mut self, interceptor: I) {
        self.response.push(Arc::new(interceptor));
    }

    pub fn request_len(&self) -> usize {
        self.request.len()
    }

    pub fn response_len(&self) -> usize {
        self.response.len()
    }

    /// Fold every request interceptor over `options` in registration order
    pub async fn apply_request(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<RequestOptions, ApiError> {
        let mut current = options.clone();
        for interceptor in &self.request {
            let replaced = interceptor
                .on_request(url, &current)
                .await
                .map_err(|source| ApiError::Interceptor {
                    phase: InterceptorPhase::Request,
                    source,
                })?;
            if let Some(next) = replaced {
                current = next;
            }
        }
        Ok(current)
    }

    /// Fold every response interceptor over `data` in registration order
    pub async fn apply_response(
        &self,
        response: &RawResponse,
        data: Value,
    ) -> Result<Value, ApiError> {
        let mut current = data;
        for interceptor in &self.response {
            let action = interceptor
                .on_response(response, &current)
                .await
                .map_err(|source| ApiError::Interceptor {
                    phase: InterceptorPhase::Response,
                    source,
                })?;
            if let ResponseAction::Replace(next) = action {
                current = next;
            }
        }
        Ok(current)
    }
}
