//! Deferred generation queue configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Generation worker pool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Number of worker tasks draining the queue
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Maximum number of pending jobs
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl GenerationConfig {
    /// Validate generation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.workers == 0 || self.workers > 64 {
            return Err(ValidationError::InvalidWorkerCount);
        }
        // Every worker should be able to have a job waiting behind it.
        if self.queue_capacity < self.workers {
            return Err(ValidationError::QueueSmallerThanPool {
                capacity: self.queue_capacity,
                workers: self.workers,
            });
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_workers() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    256
}
