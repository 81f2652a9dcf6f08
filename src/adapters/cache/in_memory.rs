//! In-memory response cache.
//!
//! Honors TTLs using tokio's clock, so tests can use paused time. Used for
//! tests and for local development without Redis.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::domain::dialog::CacheKey;
use crate::ports::{CacheError, ResponseCache};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory cache with per-entry expiry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResponseCache {
    entries: Arc<RwLock<HashMap<CacheKey, Entry>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every operation fail with a backend error (for tests).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of unexpired entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remaining lifetime of an entry (for tests).
    pub async fn ttl(&self, key: &CacheKey) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.expires_at - now)
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("cache unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ResponseCache for InMemoryResponseCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        self.check()?;
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.check()?;
        self.entries.write().await.insert(
            key.clone(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn flush(&self) -> Result<(), CacheError> {
        self.check()?;
        self.entries.write().await.clear();
        Ok(())
    }
}
