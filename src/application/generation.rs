//! Deferred generation job execution.
//!
//! Shared by the channel worker pool and the inline test queue: generate,
//! refuse to cache apologies, write the answer with the job's TTL.

use crate::domain::dialog::messages;
use crate::ports::{AIError, AnswerGenerator, GenerationJob, ResponseCache};

/// What happened to one job.
#[derive(Debug, PartialEq, Eq)]
pub enum JobOutcome {
    /// The answer is now cached under the job's key.
    Cached,
    /// The generator returned an apology; nothing was cached.
    SkippedFailureMarker,
    /// The generator failed; nothing was cached.
    GenerationFailed(AIError),
    /// The answer was generated but could not be stored.
    CacheWriteFailed(String),
}

impl JobOutcome {
    pub fn is_cached(&self) -> bool {
        matches!(self, JobOutcome::Cached)
    }
}

/// Runs one job to completion. Never retries.
pub async fn run_generation_job(
    generator: &dyn AnswerGenerator,
    cache: &dyn ResponseCache,
    job: &GenerationJob,
) -> JobOutcome {
    let answer = match generator.generate(&job.prompt).await {
        Ok(answer) => answer,
        Err(e) => {
            tracing::warn!(
                job_id = %job.id,
                kind = ?job.kind,
                generator = generator.name(),
                cache_key = %job.cache_key,
                error = %e,
                apology = e.apology(),
                "Generation failed; key stays pending"
            );
            return JobOutcome::GenerationFailed(e);
        }
    };

    if messages::is_failure_marker(&answer) {
        tracing::warn!(
            job_id = %job.id,
            cache_key = %job.cache_key,
            "Generator returned a failure marker; not caching"
        );
        return JobOutcome::SkippedFailureMarker;
    }

    match cache.set(&job.cache_key, &answer, job.ttl).await {
        Ok(()) => {
            tracing::info!(
                job_id = %job.id,
                kind = ?job.kind,
                generator = generator.name(),
                cache_key = %job.cache_key,
                ttl_secs = job.ttl.as_secs(),
                "Generated answer cached"
            );
            JobOutcome::Cached
        }
        Err(e) => {
            tracing::error!(
                job_id = %job.id,
                cache_key = %job.cache_key,
                error = %e,
                "Failed to cache generated answer"
            );
            JobOutcome::CacheWriteFailed(e.to_string())
        }
    }
}
