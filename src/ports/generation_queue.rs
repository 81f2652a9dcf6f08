//! Generation Queue Port - Deferred answer generation.
//!
//! Handlers enqueue a job and reply with a placeholder right away. A worker
//! later generates the answer and writes it under the job's cache key. Jobs
//! are never retried: a failed job leaves the key unset and polling keeps
//! reporting `pending` until the student asks again.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::dialog::CacheKey;
use crate::domain::foundation::JobId;

/// What a job answers. Only used for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Theory,
    Question,
}

/// A unit of deferred work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub id: JobId,
    pub kind: JobKind,
    pub prompt: String,
    pub cache_key: CacheKey,
    pub ttl: Duration,
}

impl GenerationJob {
    pub fn new(
        kind: JobKind,
        prompt: impl Into<String>,
        cache_key: CacheKey,
        ttl: Duration,
    ) -> Self {
        Self {
            id: JobId::new(),
            kind,
            prompt: prompt.into(),
            cache_key,
            ttl,
        }
    }
}

/// Reasons a job was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("generation queue is full")]
    Full,

    #[error("generation queue is shut down")]
    Closed,
}

/// Port for scheduling deferred generation.
#[async_trait]
pub trait GenerationQueue: Send + Sync {
    /// Accepts a job without waiting for it to run.
    async fn enqueue(&self, job: GenerationJob) -> Result<(), QueueError>;
}
