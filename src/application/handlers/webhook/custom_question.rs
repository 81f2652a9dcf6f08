//! CustomQuestionHandler - free-text questions to the generative API.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::dialog::context::QUESTION_WAIT_LIFESPAN;
use crate::domain::dialog::{messages, param, CacheKey, ContextKind, ContextUpdate, Fulfillment};
use crate::ports::{GenerationJob, GenerationQueue, JobKind, ResponseCache};

/// Handler for `Tanya Lagi ke AI` and typed questions.
pub struct CustomQuestionHandler {
    cache: Arc<dyn ResponseCache>,
    queue: Arc<dyn GenerationQueue>,
    answer_ttl: Duration,
}

impl CustomQuestionHandler {
    pub fn new(
        cache: Arc<dyn ResponseCache>,
        queue: Arc<dyn GenerationQueue>,
        answer_ttl: Duration,
    ) -> Self {
        Self {
            cache,
            queue,
            answer_ttl,
        }
    }

    /// Invites the student to type a question.
    pub fn ask_prompt(&self) -> Fulfillment {
        Fulfillment::text(messages::ASK_PROMPT).with_context(ContextUpdate::new(
            ContextKind::WaitingCustomAnswer,
            QUESTION_WAIT_LIFESPAN,
        ))
    }

    /// Answers from cache, or queues generation and returns the placeholder.
    pub async fn answer(&self, session: &str, question: &str) -> Fulfillment {
        let question = question.trim();
        if question.is_empty() {
            return Fulfillment::text(messages::EMPTY_QUESTION);
        }

        let key = CacheKey::question_answer(session, question);
        match self.cache.get(&key).await {
            Ok(Some(answer)) => {
                tracing::info!(cache_key = %key, "Question answer served from cache");
                return Fulfillment::answer(&answer);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    cache_key = %key,
                    error = %e,
                    "Answer cache unavailable; generating"
                );
            }
        }

        let job = GenerationJob::new(JobKind::Question, question, key.clone(), self.answer_ttl);
        let job_id = job.id;
        if let Err(e) = self.queue.enqueue(job).await {
            tracing::warn!(error = %e, cache_key = %key, "Generation queue refused question");
            return Fulfillment::text(messages::BUSY);
        }
        tracing::info!(%job_id, cache_key = %key, "Question generation queued");

        Fulfillment::text(messages::PROCESSING).with_context(
            ContextUpdate::new(ContextKind::WaitingCustomAnswer, QUESTION_WAIT_LIFESPAN)
                .with_param(param::CACHE_KEY, key.as_str()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAnswerGenerator;
    use crate::adapters::cache::InMemoryResponseCache;
    use crate::adapters::queue::InlineGenerationQueue;
    use crate::ports::QueueError;

    const SESSION: &str = "projects/learnable/agent/sessions/s-1";

    fn handler(
        cache: &InMemoryResponseCache,
        queue: InlineGenerationQueue,
    ) -> CustomQuestionHandler {
        CustomQuestionHandler::new(
            Arc::new(cache.clone()),
            Arc::new(queue),
            Duration::from_secs(60),
        )
    }

    #[test]
    fn ask_prompt_opens_waiting_context() {
        let cache = InMemoryResponseCache::new();
        let reply = handler(&cache, InlineGenerationQueue::recording()).ask_prompt();

        assert_eq!(reply.text.as_deref(), Some(messages::ASK_PROMPT));
        assert_eq!(reply.contexts[0].kind, ContextKind::WaitingCustomAnswer);
        assert_eq!(reply.contexts[0].lifespan, 5);
    }

    #[tokio::test]
    async fn blank_question_is_rejected() {
        let cache = InMemoryResponseCache::new();
        let queue = InlineGenerationQueue::recording();
        let reply = handler(&cache, queue.clone()).answer(SESSION, "   ").await;

        assert_eq!(reply, Fulfillment::text(messages::EMPTY_QUESTION));
        assert!(queue.jobs().is_empty());
    }

    #[tokio::test]
    async fn miss_queues_question_under_session_key() {
        let cache = InMemoryResponseCache::new();
        let queue = InlineGenerationQueue::recording();

        let reply = handler(&cache, queue.clone())
            .answer(SESSION, "Apa itu fotosintesis?")
            .await;

        let key = CacheKey::question_answer(SESSION, "Apa itu fotosintesis?");
        assert_eq!(reply.text.as_deref(), Some(messages::PROCESSING));
        assert_eq!(reply.contexts[0].kind, ContextKind::WaitingCustomAnswer);
        assert_eq!(reply.contexts[0].parameters[param::CACHE_KEY], key.as_str());

        let jobs = queue.jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].kind, JobKind::Question);
        assert_eq!(jobs[0].prompt, "Apa itu fotosintesis?");
        assert_eq!(jobs[0].ttl, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn second_ask_is_served_from_cache() {
        let cache = InMemoryResponseCache::new();
        let generator =
            MockAnswerGenerator::new().with_response("Proses tumbuhan membuat makanan.");
        let queue =
            InlineGenerationQueue::executing(Arc::new(generator.clone()), Arc::new(cache.clone()));
        let handler = handler(&cache, queue);

        handler.answer(SESSION, "Apa itu fotosintesis?").await;
        let reply = handler.answer(SESSION, "Apa itu fotosintesis?").await;

        assert_eq!(reply, Fulfillment::answer("Proses tumbuhan membuat makanan."));
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn same_question_from_another_session_is_not_shared() {
        let cache = InMemoryResponseCache::new();
        let key = CacheKey::question_answer(SESSION, "Apa itu gaya?");
        cache.set(&key, "Tarikan atau dorongan.", Duration::from_secs(60)).await.unwrap();
        let queue = InlineGenerationQueue::recording();

        let reply = handler(&cache, queue.clone())
            .answer("projects/learnable/agent/sessions/s-2", "Apa itu gaya?")
            .await;

        assert_eq!(reply.text.as_deref(), Some(messages::PROCESSING));
        assert_eq!(queue.jobs().len(), 1);
    }

    #[tokio::test]
    async fn closed_queue_reports_busy() {
        let cache = InMemoryResponseCache::new();
        let reply = handler(&cache, InlineGenerationQueue::refusing(QueueError::Closed))
            .answer(SESSION, "Apa itu energi?")
            .await;

        assert_eq!(reply, Fulfillment::text(messages::BUSY));
    }
}
