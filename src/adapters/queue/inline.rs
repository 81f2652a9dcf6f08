//! Generation queue for tests.
//!
//! Records every accepted job and, when given a generator and a cache, runs
//! it before `enqueue` returns so assertions can follow the webhook call
//! directly. Can also be told to refuse jobs.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

use crate::application::generation::run_generation_job;
use crate::ports::{AnswerGenerator, GenerationJob, GenerationQueue, QueueError, ResponseCache};

#[derive(Clone)]
struct Executor {
    generator: Arc<dyn AnswerGenerator>,
    cache: Arc<dyn ResponseCache>,
}

/// Synchronous, recording generation queue.
#[derive(Clone, Default)]
pub struct InlineGenerationQueue {
    executor: Option<Executor>,
    refuse_with: Option<QueueError>,
    jobs: Arc<Mutex<Vec<GenerationJob>>>,
}

impl InlineGenerationQueue {
    /// Records jobs without running them.
    pub fn recording() -> Self {
        Self::default()
    }

    /// Records jobs and runs each one immediately.
    pub fn executing(generator: Arc<dyn AnswerGenerator>, cache: Arc<dyn ResponseCache>) -> Self {
        Self {
            executor: Some(Executor { generator, cache }),
            ..Self::default()
        }
    }

    /// Refuses every job with `error`.
    pub fn refusing(error: QueueError) -> Self {
        Self {
            refuse_with: Some(error),
            ..Self::default()
        }
    }

    /// Jobs accepted so far.
    pub fn jobs(&self) -> Vec<GenerationJob> {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl GenerationQueue for InlineGenerationQueue {
    async fn enqueue(&self, job: GenerationJob) -> Result<(), QueueError> {
        if let Some(error) = &self.refuse_with {
            return Err(error.clone());
        }

        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(job.clone());

        if let Some(executor) = &self.executor {
            run_generation_job(&*executor.generator, &*executor.cache, &job).await;
        }
        Ok(())
    }
}

impl std::fmt::Debug for InlineGenerationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineGenerationQueue")
            .field("executing", &self.executor.is_some())
            .field("refuse_with", &self.refuse_with)
            .finish_non_exhaustive()
    }
}
