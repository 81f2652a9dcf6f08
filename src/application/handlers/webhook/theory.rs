//! TheoryHandler - grounded explanation of a subbab.
//!
//! A cached answer is returned synchronously. Otherwise a generation job is
//! queued and the student gets a placeholder plus a `waiting_theory_answer`
//! context holding the key to poll.

use std::sync::Arc;
use std::time::Duration;

use super::menu::MenuNavigator;
use super::HandlerError;
use crate::domain::curriculum::SchoolLevel;
use crate::domain::dialog::context::THEORY_WAIT_LIFESPAN;
use crate::domain::dialog::{
    messages, param, CacheKey, ContextKind, ContextUpdate, DialogState, Fulfillment,
};
use crate::ports::{CurriculumStore, GenerationJob, GenerationQueue, JobKind, ResponseCache};

/// Handler for `Pilih Subbab`.
pub struct TheoryHandler {
    store: Arc<dyn CurriculumStore>,
    cache: Arc<dyn ResponseCache>,
    queue: Arc<dyn GenerationQueue>,
    menu: Arc<MenuNavigator>,
    answer_ttl: Duration,
}

impl TheoryHandler {
    pub fn new(
        store: Arc<dyn CurriculumStore>,
        cache: Arc<dyn ResponseCache>,
        queue: Arc<dyn GenerationQueue>,
        menu: Arc<MenuNavigator>,
        answer_ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            queue,
            menu,
            answer_ttl,
        }
    }

    pub async fn handle(
        &self,
        query_text: &str,
        dialog: &DialogState,
    ) -> Result<Fulfillment, HandlerError> {
        let title = query_text.trim();
        let level = dialog
            .deepest_stage()
            .map(|stage| stage.level())
            .or_else(|| dialog.any_param(param::SCHOOL_LEVEL).and_then(SchoolLevel::parse));

        let (Some(level), false) = (level, title.is_empty()) else {
            tracing::info!(title, "Subbab chosen without level; re-prompting");
            return Ok(self.menu.reprompt_previous(dialog).await);
        };

        match self.explain(level, title, dialog).await {
            Ok(reply) => Ok(reply),
            Err(HandlerError::Store(e)) => Ok(self.menu.recover(dialog, "teori", e).await),
            Err(HandlerError::Queue(e)) => {
                tracing::warn!(error = %e, title, "Generation queue refused job");
                Ok(Fulfillment::text(messages::BUSY))
            }
            Err(e) => Err(e),
        }
    }

    async fn explain(
        &self,
        level: SchoolLevel,
        title: &str,
        dialog: &DialogState,
    ) -> Result<Fulfillment, HandlerError> {
        let Some(subbab) = self.store.find_subbab(title).await? else {
            tracing::warn!(title, "Subbab not found");
            return Ok(match self.menu.previous_step(dialog).await? {
                Some(menu) => menu.with_notice(&messages::subbab_not_found(title)),
                None => Fulfillment::text(messages::SUBBAB_NOT_FOUND),
            });
        };

        let key = CacheKey::theory_answer(level, title);
        match self.cache.get(&key).await {
            Ok(Some(answer)) => {
                tracing::info!(cache_key = %key, title, "Theory answer served from cache");
                return Ok(Fulfillment::answer(&answer));
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

        let prompt = messages::theory_prompt(level, title, &subbab.content);
        let job = GenerationJob::new(JobKind::Theory, prompt, key.clone(), self.answer_ttl);
        let job_id = job.id;
        self.queue.enqueue(job).await?;
        tracing::info!(%job_id, cache_key = %key, title, "Theory generation queued");

        Ok(Fulfillment::text(messages::PROCESSING).with_context(
            ContextUpdate::new(ContextKind::WaitingTheoryAnswer, THEORY_WAIT_LIFESPAN)
                .with_param(param::CACHE_KEY, key.as_str())
                .with_param(param::SCHOOL_LEVEL, level.code())
                .with_param(param::SUBBAB_NAME, title),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::adapters::queue::InlineGenerationQueue;
    use crate::domain::dialog::ActiveContext;
    use crate::ports::QueueError;

    fn handler(fx: &Fixture, queue: InlineGenerationQueue) -> TheoryHandler {
        TheoryHandler::new(
            Arc::new(fx.store.clone()),
            Arc::new(fx.cache.clone()),
            Arc::new(queue),
            Arc::new(fx.navigator()),
            Duration::from_secs(6 * 3600),
        )
    }

    fn at_lesson() -> DialogState {
        DialogState::new(vec![ActiveContext::new(ContextKind::SubbabSelection)
            .with_param(param::SCHOOL_LEVEL, "sd")
            .with_param(param::SUBJECT_NAME, "Matematika")
            .with_param(param::LESSON_NAME, "Pecahan")])
    }

    #[tokio::test]
    async fn cache_hit_answers_synchronously() {
        let fx = Fixture::new();
        let key = CacheKey::theory_answer(SchoolLevel::Sd, "Pecahan Senilai");
        fx.cache.set(&key, "Pecahan senilai adalah...", Duration::from_secs(60)).await.unwrap();
        let queue = InlineGenerationQueue::recording();

        let reply = handler(&fx, queue.clone())
            .handle("Pecahan Senilai", &at_lesson())
            .await
            .unwrap();

        assert_eq!(reply, Fulfillment::answer("Pecahan senilai adalah..."));
        assert!(queue.jobs().is_empty());
    }

    #[tokio::test]
    async fn cache_miss_queues_grounded_job_and_returns_placeholder() {
        let fx = Fixture::new();
        let queue = InlineGenerationQueue::recording();

        let reply = handler(&fx, queue.clone())
            .handle("Penjumlahan Pecahan", &at_lesson())
            .await
            .unwrap();

        assert_eq!(reply.text.as_deref(), Some(messages::PROCESSING));
        let ctx = &reply.contexts[0];
        assert_eq!(ctx.kind, ContextKind::WaitingTheoryAnswer);
        assert_eq!(ctx.lifespan, 3);

        let expected_key = CacheKey::theory_answer(SchoolLevel::Sd, "Penjumlahan Pecahan");
        assert_eq!(ctx.parameters[param::CACHE_KEY], expected_key.as_str());
        assert_eq!(ctx.parameters[param::SUBBAB_NAME], "Penjumlahan Pecahan");

        let jobs = queue.jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].cache_key, expected_key);
        assert_eq!(jobs[0].ttl, Duration::from_secs(6 * 3600));
        assert!(jobs[0].prompt.contains("tunarungu SD tentang 'Penjumlahan Pecahan'"));
        assert!(jobs[0].prompt.contains("Samakan penyebutnya"));
    }

    #[tokio::test]
    async fn unknown_subbab_returns_previous_chips_with_notice() {
        let fx = Fixture::new();
        let reply = handler(&fx, InlineGenerationQueue::recording())
            .handle("Perkalian", &at_lesson())
            .await
            .unwrap();

        assert!(reply.texts()[0]
            .starts_with("❗ Subbab 'Perkalian' tidak ditemukan.\nBerikut sub-bab dari Pecahan:"));
        assert_eq!(reply.contexts[0].kind, ContextKind::SubbabSelection);
    }

    #[tokio::test]
    async fn unknown_subbab_without_history_is_flat() {
        let fx = Fixture::new();
        let dialog = DialogState::new(vec![ActiveContext::new(ContextKind::WaitingTheoryAnswer)
            .with_param(param::SCHOOL_LEVEL, "sd")]);

        let reply = handler(&fx, InlineGenerationQueue::recording())
            .handle("Perkalian", &dialog)
            .await
            .unwrap();

        assert_eq!(reply, Fulfillment::text("Subbab tidak ditemukan."));
    }

    #[tokio::test]
    async fn missing_level_reprompts() {
        let fx = Fixture::new();
        let reply = handler(&fx, InlineGenerationQueue::recording())
            .handle("Pecahan Senilai", &DialogState::default())
            .await
            .unwrap();
        assert_eq!(reply.texts(), vec![messages::LEVEL_REPROMPT]);
    }

    #[tokio::test]
    async fn refused_job_reports_busy() {
        let fx = Fixture::new();
        let reply = handler(&fx, InlineGenerationQueue::refusing(QueueError::Full))
            .handle("Pecahan Senilai", &at_lesson())
            .await
            .unwrap();

        assert_eq!(reply, Fulfillment::text(messages::BUSY));
        assert!(fx.cache.is_empty().await);
    }

    #[tokio::test]
    async fn store_failure_falls_back_with_notice() {
        let fx = Fixture::new();
        let handler = handler(&fx, InlineGenerationQueue::recording());
        // Warm the subbab listing so the fallback can still be rebuilt.
        fx.navigator().previous_step(&at_lesson()).await.unwrap();
        fx.store.set_failing(true);

        let reply = handler.handle("Pecahan Senilai", &at_lesson()).await.unwrap();

        assert!(reply.texts()[0].starts_with("❗ Terjadi kesalahan saat mengambil teori."));
        assert_eq!(reply.chips(), vec!["Penjumlahan Pecahan", "Pecahan Senilai"]);
    }
}
