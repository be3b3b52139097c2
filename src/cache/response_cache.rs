//! Response Cache Implementation
//!
//! Time-bounded cache of successful read results keyed by `METHOD:url`.
//! Expired entries are removed lazily on lookup; mutations purge whole
//! resource families by substring match.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::client::Method;

/// Default time-to-live for cached responses
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// A cached response payload
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The decoded payload
    data: Value,
    /// When this entry was cached
    cached_at: Instant,
}

/// Per-entry view returned by [`ResponseCache::stats`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntryStats {
    pub key: String,
    /// Time since the entry was captured
    pub age: Duration,
    /// Time left before expiry, `None` once the TTL has passed
    pub expires_in: Option<Duration>,
}

/// Snapshot of the cache contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub entries: Vec<CacheEntryStats>,
}

impl CacheStats {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }
}

/// Response cache with TTL support
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    /// When false, lookups always miss and stores are discarded
    enabled: bool,
}

impl ResponseCache {
    pub fn new(ttl: Duration, enabled: bool) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            enabled,
        }
    }

    /// Create an enabled cache with a custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(ttl, true)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Build the cache key for a request target
    pub fn key(method: Method, url: &str) -> String {
        format!("{}:{}", method, url)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a live entry
    ///
    /// An entry older than the TTL is removed and reported as a miss.
    pub fn get(&self, key: &str) -> Option<Value> {
        if !self.enabled {
            return None;
        }

        let mut entries = self.lock();
        let age = entries.get(key)?.cached_at.elapsed();
        if age > self.ttl {
            entries.remove(key);
            trace!(key = key, age_ms = age.as_millis() as u64, "Evicted expired cache entry");
            return None;
        }

        trace!(key = key, "Cache lookup hit");
        entries.get(key).map(|entry| entry.data.clone())
    }

    /// Insert or overwrite an entry stamped with the current time
    pub fn insert(&self, key: &str, data: Value) {
        if !self.enabled {
            return;
        }

        let entry = CacheEntry {
            data,
            cached_at: Instant::now(),
        };
        self.lock().insert(key.to_string(), entry);
        trace!(key = key, "Cached response");
    }

    /// Remove every entry whose key contains `pattern`
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&self, pattern: &str) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.contains(pattern));
        let removed = before - entries.len();
        debug!(pattern = pattern, removed = removed, "Invalidated cached responses");
        removed
    }

    /// Remove all entries
    pub fn clear(&self) {
        self.lock().clear();
        debug!("Cleared response cache");
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of sizes and ages; does not evict expired entries
    pub fn stats(&self) -> CacheStats {
        let entries = self.lock();
        let mut stats: Vec<CacheEntryStats> = entries
            .iter()
            .map(|(key, entry)| {
                let age = entry.cached_at.elapsed();
                CacheEntryStats {
                    key: key.clone(),
                    age,
                    expires_in: self.ttl.checked_sub(age),
                }
            })
            .collect();
        stats.sort_by(|a, b| a.key.cmp(&b.key));

        CacheStats {
            size: entries.len(),
            entries: stats,
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }
}
