//! Client configuration

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use crate::cache::DEFAULT_CACHE_TTL;

/// Per-attempt request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Linear backoff unit
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Settings fixed at client construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub max_retries: u32,
    /// Delay before retry `n` is `n * retry_base_delay`
    pub retry_base_delay: Duration,
    pub enable_cache: bool,
    pub cache_ttl: Duration,
    /// Emit per-request lifecycle events
    pub enable_logging: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            enable_cache: true,
            cache_ttl: DEFAULT_CACHE_TTL,
            enable_logging: false,
        }
    }
}

impl ClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.enable_cache = enabled;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Defaults with overrides from the environment
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Override fields whose variables are set
    ///
    /// Reads `API_TIMEOUT_MS`, `API_MAX_RETRIES`, `API_RETRY_DELAY_MS`,
    /// `API_CACHE`, `API_CACHE_TTL_MS` and `API_LOGGING`.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ms) = parse_var::<u64>(&lookup, "API_TIMEOUT_MS")? {
            self.timeout = Duration::from_millis(ms);
        }
        if let Some(retries) = parse_var::<u32>(&lookup, "API_MAX_RETRIES")? {
            self.max_retries = retries;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "API_RETRY_DELAY_MS")? {
            self.retry_base_delay = Duration::from_millis(ms);
        }
        if let Some(enabled) = parse_var::<bool>(&lookup, "API_CACHE")? {
            self.enable_cache = enabled;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "API_CACHE_TTL_MS")? {
            self.cache_ttl = Duration::from_millis(ms);
        }
        if let Some(enabled) = parse_var::<bool>(&lookup, "API_LOGGING")? {
            self.enable_logging = enabled;
        }
        Ok(self)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {}: {:?}", name, raw))
        })
        .transpose()
}
