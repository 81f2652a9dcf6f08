//! AnswerStatusHandler - polling for a deferred answer.

use std::sync::Arc;

use crate::domain::dialog::{CacheKey, Fulfillment};
use crate::ports::ResponseCache;

/// Whether a deferred answer has landed in the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerStatus {
    /// The answer template, ready to show.
    Ready(Fulfillment),
    Pending,
}

pub struct AnswerStatusHandler {
    cache: Arc<dyn ResponseCache>,
}

impl AnswerStatusHandler {
    pub fn new(cache: Arc<dyn ResponseCache>) -> Self {
        Self { cache }
    }

    /// Looks an answer key up. A cache failure reads as pending.
    pub async fn check(&self, key: &CacheKey) -> AnswerStatus {
        match self.cache.get(key).await {
            Ok(Some(answer)) => {
                tracing::debug!(cache_key = %key, "Deferred answer ready");
                AnswerStatus::Ready(Fulfillment::answer(&answer))
            }
            Ok(None) => AnswerStatus::Pending,
            Err(e) => {
                tracing::warn!(cache_key = %key, error = %e, "Cache unavailable while polling");
                AnswerStatus::Pending
            }
        }
    }
}
