//! Cache traits for StockFlow
//!
//! This module defines the trait that all cache implementations must
//! satisfy.

use async_trait::async_trait;
use std::time::Duration;

/// Errors that can occur in the cache
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Cache error: {0}")]
    Other(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Durable key/value store with per-key time-to-live.
///
/// Values are serialized JSON strings; typed access lives with the
/// callers. Implementations can be in-memory, Redis, or any other
/// backend with the same contract: `get` on a missing or expired key
/// returns `None`, `set` overwrites unconditionally (last writer wins).
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Store a value under a key with a time-to-live
    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    /// Fetch a value; `None` when absent or expired
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Remove a key; removing a missing key is not an error
    async fn delete(&self, key: &str) -> CacheResult<()>;
}
