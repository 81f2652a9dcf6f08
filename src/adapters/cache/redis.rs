//! Redis-backed response cache for production deployments.
//!
//! Uses `GET`, `SET key value EX ttl` and `FLUSHDB`. Every command carries a
//! client-side deadline so a stalled Redis degrades to a cache error instead
//! of hanging the webhook.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::future::Future;
use std::time::Duration;

use crate::config::RedisConfig;
use crate::domain::dialog::CacheKey;
use crate::ports::{CacheError, ResponseCache};

/// Redis response cache.
#[derive(Clone)]
pub struct RedisResponseCache {
    conn: MultiplexedConnection,
    timeout: Duration,
}

impl RedisResponseCache {
    /// Wraps an established connection.
    pub fn new(conn: MultiplexedConnection, timeout: Duration) -> Self {
        Self { conn, timeout }
    }

    /// Opens a multiplexed connection from configuration.
    pub async fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        let url = config
            .url()
            .ok_or_else(|| CacheError::Backend("redis url not configured".to_string()))?;
        let client = redis::Client::open(url).map_err(map_redis_error)?;

        let conn = tokio::time::timeout(config.timeout(), client.get_multiplexed_tokio_connection())
            .await
            .map_err(|_| CacheError::Timeout)?
            .map_err(map_redis_error)?;

        Ok(Self::new(conn, config.timeout()))
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T, CacheError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        tokio::time::timeout(self.timeout, op)
            .await
            .map_err(|_| CacheError::Timeout)?
            .map_err(map_redis_error)
    }
}

// A value that is not valid UTF-8 surfaces as a type error from redis.
fn map_redis_error(e: redis::RedisError) -> CacheError {
    match e.kind() {
        redis::ErrorKind::TypeError => CacheError::Decode(e.to_string()),
        _ => CacheError::Backend(e.to_string()),
    }
}

#[async_trait]
impl ResponseCache for RedisResponseCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.get::<_, Option<String>>(key.as_str())).await
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let secs = ttl.as_secs().max(1);

        self.bounded(
            redis::cmd("SET")
                .arg(key.as_str())
                .arg(value)
                .arg("EX")
                .arg(secs)
                .query_async::<_, ()>(&mut conn),
        )
        .await
    }

    async fn flush(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        self.bounded(redis::cmd("FLUSHDB").query_async::<_, ()>(&mut conn))
            .await
    }
}

impl std::fmt::Debug for RedisResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisResponseCache")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    // Redis integration tests need a running instance; the cache contract is
    // exercised against InMemoryResponseCache in the handler tests.
    use super::*;
    use secrecy::Secret;

    #[tokio::test]
    async fn connect_rejects_malformed_url() {
        let config = RedisConfig {
            url: Some(Secret::new("not a url".to_string())),
            ..Default::default()
        };
        assert!(matches!(
            RedisResponseCache::connect(&config).await,
            Err(CacheError::Backend(_))
        ));

        assert!(matches!(
            RedisResponseCache::connect(&RedisConfig::default()).await,
            Err(CacheError::Backend(_))
        ));
    }

    #[test]
    fn type_errors_map_to_decode() {
        let err = redis::RedisError::from((redis::ErrorKind::TypeError, "invalid utf-8"));
        assert!(matches!(map_redis_error(err), CacheError::Decode(_)));

        let err = redis::RedisError::from((redis::ErrorKind::IoError, "connection reset"));
        assert!(matches!(map_redis_error(err), CacheError::Backend(_)));
    }
}
