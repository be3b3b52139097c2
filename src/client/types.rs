//! Request and response types shared across the pipeline

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::errors::ApiError;

/// HTTP verbs supported by the client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether a successful call with this verb invalidates cached reads
    pub fn is_mutation(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Delete)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Options for a single request as it flows through the pipeline
///
/// Interceptors receive a reference and return a replacement, so the value a
/// caller hands in is never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    /// JSON-encoded body
    pub body: Option<String>,
    /// Bypass the cache for reads
    pub force_refresh: bool,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Serialize `payload` as the body and mark it as JSON
    pub fn with_json_body<T: Serialize + ?Sized>(self, payload: &T) -> Result<Self, ApiError> {
        let body =
            serde_json::to_string(payload).map_err(|e| ApiError::Serialize(e.to_string()))?;
        let mut options = self.with_header("Content-Type", "application/json");
        options.body = Some(body);
        Ok(options)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Options accepted by reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Skip the cache lookup and always fetch live
    pub force_refresh: bool,
}

impl ReadOptions {
    pub fn force_refresh() -> Self {
        Self {
            force_refresh: true,
        }
    }
}

/// Completed HTTP response, status not yet interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            status_text: String::new(),
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    ///
    /// An empty body decodes to `null`.
    pub fn json(&self) -> Result<Value, ApiError> {
        if self.body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Decoded payload plus its provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub data: Value,
    /// True when served from the response cache without a network call
    pub from_cache: bool,
}

impl ApiResponse {
    pub fn fresh(data: Value) -> Self {
        Self {
            data,
            from_cache: false,
        }
    }

    pub fn cached(data: Value) -> Self {
        Self {
            data,
            from_cache: true,
        }
    }

    /// Decode the payload into a typed value
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        T::deserialize(&self.data).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Combine a base address and an endpoint path into a full target
pub fn join_url(base_url: &str, endpoint: &str) -> Result<String, ApiError> {
    if endpoint.trim().is_empty() {
        return Err(ApiError::InvalidEndpoint(endpoint.to_string()));
    }
    Ok(format!("{}{}", base_url, endpoint))
}

/// Leading path segment used to purge cached reads after a mutation
///
/// `/posts/1` and `/posts?userId=1` both map to `posts`. Falls back to the
/// whole endpoint when there is no segment.
pub fn resource_family(endpoint: &str) -> &str {
    endpoint
        .trim_start_matches('/')
        .split(['/', '?', '#'])
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(endpoint)
}
