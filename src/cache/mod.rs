//! Response caching layer
//!
//! Keeps successful read results for a bounded time so repeated reads of the
//! same target skip the network entirely.

pub mod response_cache;

pub use response_cache::{CacheEntryStats, CacheStats, ResponseCache, DEFAULT_CACHE_TTL};
