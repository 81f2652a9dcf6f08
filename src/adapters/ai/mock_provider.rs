//! Mock Answer Generator for testing.
//!
//! Provides a configurable mock implementation of the AnswerGenerator port,
//! allowing tests to run without calling the real generative API.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in order
//! - Simulated delays for worker and timeout testing
//! - Error injection for resilience testing
//! - Call tracking for cache-hit verification
//!
//! # Example
//!
//! ```ignore
//! let generator = MockAnswerGenerator::new()
//!     .with_response("Pecahan adalah bagian dari keseluruhan.")
//!     .with_delay(Duration::from_millis(50));
//!
//! let answer = generator.generate("Jelaskan pecahan").await?;
//! assert_eq!(generator.call_count(), 1);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{AIError, AnswerGenerator};

/// Mock generator for testing.
#[derive(Debug, Clone, Default)]
pub struct MockAnswerGenerator {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<Result<String, AIError>>>>,
    /// Simulated latency per request.
    delay: Duration,
    /// Prompts received, in call order.
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockAnswerGenerator {
    /// Answer returned once the configured responses run out.
    pub const DEFAULT_ANSWER: &'static str = "Mock answer";

    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        lock(&self.responses).push_back(Ok(content.into()));
        self
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: AIError) -> Self {
        lock(&self.responses).push_back(Err(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this generator.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded prompts.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    fn next_response(&self) -> Result<String, AIError> {
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Ok(Self::DEFAULT_ANSWER.to_string()))
    }
}

// A panicking test thread must not cascade into every other assertion.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl AnswerGenerator for MockAnswerGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, AIError> {
        lock(&self.calls).push(prompt.to_string());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        if prompt.trim().is_empty() {
            return Err(AIError::EmptyPrompt);
        }
        self.next_response()
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_configured_responses_in_order() {
        let generator = MockAnswerGenerator::new()
            .with_response("first")
            .with_error(AIError::Network("down".into()))
            .with_response("second");

        assert_eq!(generator.generate("a").await.unwrap(), "first");
        assert!(matches!(generator.generate("b").await, Err(AIError::Network(_))));
        assert_eq!(generator.generate("c").await.unwrap(), "second");
        assert_eq!(
            generator.generate("d").await.unwrap(),
            MockAnswerGenerator::DEFAULT_ANSWER
        );
    }

    #[tokio::test]
    async fn tracks_calls_across_clones() {
        let generator = MockAnswerGenerator::new();
        let clone = generator.clone();

        clone.generate("Apa itu pecahan?").await.unwrap();

        assert_eq!(generator.call_count(), 1);
        assert_eq!(generator.prompts(), vec!["Apa itu pecahan?".to_string()]);
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_but_counted() {
        let generator = MockAnswerGenerator::new().with_response("unused");
        assert_eq!(generator.generate(" ").await, Err(AIError::EmptyPrompt));
        assert_eq!(generator.call_count(), 1);
    }
}
