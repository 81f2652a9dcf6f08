//! Response Cache Port - String key/value cache with expiry.
//!
//! Holds serialized menu listings and generated answers. Entries are
//! idempotent per key, so concurrent writers simply race and the last wins.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::dialog::CacheKey;

/// Errors raised by the cache backend.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache operation timed out")]
    Timeout,

    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cached value could not be decoded: {0}")]
    Decode(String),
}

/// Port for the response cache.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Returns the value stored under `key`, if present and unexpired.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Drops every entry.
    async fn flush(&self) -> Result<(), CacheError>;
}
