//! FlushCacheHandler - drops every cached listing and answer.

use std::sync::Arc;

use super::HandlerError;
use crate::ports::ResponseCache;

pub struct FlushCacheHandler {
    cache: Arc<dyn ResponseCache>,
}

impl FlushCacheHandler {
    pub fn new(cache: Arc<dyn ResponseCache>) -> Self {
        Self { cache }
    }

    pub async fn handle(&self) -> Result<(), HandlerError> {
        self.cache.flush().await?;
        tracing::info!("Response cache flushed");
        Ok(())
    }
}
