//! MenuNavigator - level → subject → lesson selection.
//!
//! Each listing is cached under a colon-joined key (`subjects:sd`,
//! `lessons:sd:Matematika`, `subbabs:sd:Matematika:Pecahan`). Only found
//! listings are cached, and always without contexts: the stage context is
//! attached per request so one session never sees another's.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::welcome::level_reprompt;
use super::HandlerError;
use crate::domain::curriculum::SchoolLevel;
use crate::domain::dialog::context::string_param;
use crate::domain::dialog::{
    messages, param, CacheKey, ContextKind, DialogState, Fulfillment, MenuStage,
};
use crate::ports::{CurriculumStore, ResponseCache, StoreError};

/// Result of building one menu listing.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    /// Message plus chips, without contexts.
    Found(Fulfillment),
    /// The parent exists but has no children.
    Empty,
    /// The parent entity itself was not found.
    ParentMissing,
}

/// Handler for the menu navigation intents.
pub struct MenuNavigator {
    store: Arc<dyn CurriculumStore>,
    cache: Arc<dyn ResponseCache>,
    listing_ttl: Duration,
}

impl MenuNavigator {
    pub fn new(
        store: Arc<dyn CurriculumStore>,
        cache: Arc<dyn ResponseCache>,
        listing_ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            listing_ttl,
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Intents
    // ════════════════════════════════════════════════════════════════════════

    /// `Pilih Jenjang`: list the subjects of the chosen level.
    pub async fn select_level(
        &self,
        query_text: &str,
        parameters: &HashMap<String, Value>,
        dialog: &DialogState,
    ) -> Result<Fulfillment, HandlerError> {
        let level = string_param(parameters, param::SCHOOL_LEVEL)
            .and_then(SchoolLevel::parse)
            .or_else(|| SchoolLevel::parse(query_text));

        let Some(level) = level else {
            tracing::info!(query_text, "No recognizable level; re-prompting");
            return Ok(level_reprompt());
        };

        match self.subject_menu(level).await {
            Ok(Some(reply)) => Ok(reply),
            Ok(None) => Ok(level_reprompt().with_notice(&messages::no_subjects(level))),
            Err(e) => Ok(self.recover(dialog, "pelajaran", e).await),
        }
    }

    /// `Pilih Pelajaran`: list the lessons of the chosen subject.
    pub async fn select_subject(
        &self,
        query_text: &str,
        dialog: &DialogState,
    ) -> Result<Fulfillment, HandlerError> {
        let level = dialog
            .param(ContextKind::SubjectSelection, param::SCHOOL_LEVEL)
            .and_then(SchoolLevel::parse)
            .or_else(|| dialog.deepest_stage().map(|s| s.level()));

        let Some(level) = level else {
            tracing::info!("Subject chosen without a level; re-prompting for level");
            return Ok(level_reprompt());
        };

        let subject = query_text.trim();
        if subject.is_empty() {
            return Ok(self.reprompt_previous(dialog).await);
        }

        match self.lessons_of(level, subject).await {
            Ok(reply) => Ok(reply),
            Err(e) => Ok(self.recover(dialog, "materi", e).await),
        }
    }

    /// `Pilih Materi`: list the subbabs of the chosen lesson.
    pub async fn select_lesson(
        &self,
        query_text: &str,
        dialog: &DialogState,
    ) -> Result<Fulfillment, HandlerError> {
        let Some(MenuStage::LessonSelection { level, subject }) =
            dialog.stage(ContextKind::LessonSelection)
        else {
            tracing::info!("Lesson chosen without level/subject context; re-prompting");
            return Ok(self.reprompt_previous(dialog).await);
        };

        let lesson = query_text.trim();
        if lesson.is_empty() {
            return Ok(self.reprompt_previous(dialog).await);
        }

        match self.subbabs_of(level, &subject, lesson).await {
            Ok(reply) => Ok(reply),
            Err(e) => Ok(self.recover(dialog, "sub-bab", e).await),
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Selection outcomes
    // ════════════════════════════════════════════════════════════════════════

    async fn lessons_of(
        &self,
        level: SchoolLevel,
        subject: &str,
    ) -> Result<Fulfillment, StoreError> {
        match self.lesson_listing(level, subject).await? {
            Listing::Found(menu) => {
                tracing::info!(level = level.code(), subject, "Listing lessons");
                Ok(menu.with_context(
                    MenuStage::LessonSelection {
                        level,
                        subject: subject.to_string(),
                    }
                    .to_context(),
                ))
            }
            Listing::ParentMissing => {
                tracing::info!(
                    level = level.code(),
                    subject,
                    "Subject not found; listing siblings"
                );
                self.subject_menu_with_notice(level, &messages::subject_not_found(subject, level))
                    .await
            }
            Listing::Empty => {
                tracing::info!(level = level.code(), subject, "Subject has no lessons");
                self.subject_menu_with_notice(level, &messages::no_lessons(subject, level))
                    .await
            }
        }
    }

    async fn subbabs_of(
        &self,
        level: SchoolLevel,
        subject: &str,
        lesson: &str,
    ) -> Result<Fulfillment, StoreError> {
        let notice = match self.subbab_listing(level, subject, lesson).await? {
            Listing::Found(menu) => {
                tracing::info!(level = level.code(), subject, lesson, "Listing subbabs");
                return Ok(menu.with_context(
                    MenuStage::SubbabSelection {
                        level,
                        subject: subject.to_string(),
                        lesson: lesson.to_string(),
                    }
                    .to_context(),
                ));
            }
            Listing::ParentMissing => messages::lesson_not_found(lesson, subject),
            Listing::Empty => messages::no_subbabs(lesson),
        };

        tracing::info!(
            level = level.code(),
            subject,
            lesson,
            "No subbabs to show; listing sibling lessons"
        );
        match self.lesson_listing(level, subject).await? {
            Listing::Found(menu) => Ok(menu.with_notice(&notice).with_context(
                MenuStage::LessonSelection {
                    level,
                    subject: subject.to_string(),
                }
                .to_context(),
            )),
            Listing::ParentMissing => {
                self.subject_menu_with_notice(level, &messages::subject_not_found(subject, level))
                    .await
            }
            Listing::Empty => {
                self.subject_menu_with_notice(level, &messages::no_lessons(subject, level))
                    .await
            }
        }
    }

    /// Subject chips for the level with the subject-stage context, if any exist.
    pub(super) async fn subject_menu(
        &self,
        level: SchoolLevel,
    ) -> Result<Option<Fulfillment>, StoreError> {
        Ok(match self.subject_listing(level).await? {
            Listing::Found(menu) => {
                Some(menu.with_context(MenuStage::SubjectSelection { level }.to_context()))
            }
            Listing::Empty | Listing::ParentMissing => None,
        })
    }

    async fn subject_menu_with_notice(
        &self,
        level: SchoolLevel,
        notice: &str,
    ) -> Result<Fulfillment, StoreError> {
        Ok(match self.subject_menu(level).await? {
            Some(menu) => menu.with_notice(notice),
            None => level_reprompt().with_notice(notice),
        })
    }

    // ════════════════════════════════════════════════════════════════════════
    // Cached listings
    // ════════════════════════════════════════════════════════════════════════

    pub(super) async fn subject_listing(&self, level: SchoolLevel) -> Result<Listing, StoreError> {
        let key = CacheKey::subjects(level);
        if let Some(cached) = self.cached(&key).await {
            return Ok(cached);
        }

        let subjects = self.store.subjects_for_level(level).await?;
        let chips = non_empty(subjects.into_iter().map(|s| s.name));
        let listing = if chips.is_empty() {
            Listing::Empty
        } else {
            Listing::Found(Fulfillment::menu(messages::subjects_heading(level), chips))
        };
        self.remember(&key, &listing).await;
        Ok(listing)
    }

    pub(super) async fn lesson_listing(
        &self,
        level: SchoolLevel,
        subject: &str,
    ) -> Result<Listing, StoreError> {
        let key = CacheKey::lessons(level, subject);
        if let Some(cached) = self.cached(&key).await {
            return Ok(cached);
        }

        let Some(found) = self.store.find_subject(level, subject).await? else {
            return Ok(Listing::ParentMissing);
        };
        let lessons = self.store.lessons_for_subject(&found.id_subject).await?;
        let chips = non_empty(lessons.into_iter().map(|l| l.title));
        let listing = if chips.is_empty() {
            Listing::Empty
        } else {
            Listing::Found(Fulfillment::menu(messages::lessons_heading(level, subject), chips))
        };
        self.remember(&key, &listing).await;
        Ok(listing)
    }

    pub(super) async fn subbab_listing(
        &self,
        level: SchoolLevel,
        subject: &str,
        lesson: &str,
    ) -> Result<Listing, StoreError> {
        let key = CacheKey::subbabs(level, subject, lesson);
        if let Some(cached) = self.cached(&key).await {
            return Ok(cached);
        }

        let Some(found_subject) = self.store.find_subject(level, subject).await? else {
            return Ok(Listing::ParentMissing);
        };
        let Some(found_lesson) = self
            .store
            .find_lesson(&found_subject.id_subject, lesson)
            .await?
        else {
            return Ok(Listing::ParentMissing);
        };
        let subbabs = self.store.subbabs_for_lesson(&found_lesson.id).await?;
        let chips = non_empty(subbabs.into_iter().map(|s| s.title));
        let listing = if chips.is_empty() {
            Listing::Empty
        } else {
            Listing::Found(Fulfillment::menu(messages::subbabs_heading(lesson), chips))
        };
        self.remember(&key, &listing).await;
        Ok(listing)
    }

    /// Cached listing, if present and decodable. Cache trouble is a miss.
    async fn cached(&self, key: &CacheKey) -> Option<Listing> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Fulfillment>(&raw) {
                Ok(menu) => {
                    tracing::debug!(cache_key = %key, "Listing cache hit");
                    Some(Listing::Found(menu))
                }
                Err(e) => {
                    tracing::warn!(
                        cache_key = %key,
                        error = %e,
                        "Undecodable cached listing; rebuilding"
                    );
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    cache_key = %key,
                    error = %e,
                    "Listing cache unavailable; querying store"
                );
                None
            }
        }
    }

    async fn remember(&self, key: &CacheKey, listing: &Listing) {
        let Listing::Found(menu) = listing else {
            return;
        };
        let raw = match serde_json::to_string(&menu.without_contexts()) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(cache_key = %key, error = %e, "Could not serialize listing");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, &raw, self.listing_ttl).await {
            tracing::warn!(cache_key = %key, error = %e, "Failed to cache listing");
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Fallbacks
    // ════════════════════════════════════════════════════════════════════════

    /// Re-prompt for the previous step, or the level chips when nothing is recoverable.
    pub async fn reprompt_previous(&self, dialog: &DialogState) -> Fulfillment {
        match self.previous_step(dialog).await {
            Ok(Some(reply)) => reply,
            Ok(None) => level_reprompt(),
            Err(e) => {
                tracing::warn!(error = %e, "Previous step lookup failed");
                level_reprompt()
            }
        }
    }

    /// Turns a lookup failure into the previous menu with an error notice,
    /// or a flat apology when no previous menu can be rebuilt.
    pub async fn recover(
        &self,
        dialog: &DialogState,
        what: &str,
        error: StoreError,
    ) -> Fulfillment {
        tracing::error!(error = %error, what, "Curriculum lookup failed");
        match self.previous_step(dialog).await {
            Ok(Some(reply)) => reply.with_notice(&messages::lookup_failed(what)),
            Ok(None) => Fulfillment::text(messages::GENERIC_ERROR),
            Err(e) => {
                tracing::warn!(error = %e, "Previous step lookup failed too");
                Fulfillment::text(messages::GENERIC_ERROR)
            }
        }
    }
}

fn non_empty(labels: impl Iterator<Item = String>) -> Vec<String> {
    labels
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::domain::dialog::ActiveContext;

    fn navigator(fx: &Fixture) -> MenuNavigator {
        MenuNavigator::new(
            Arc::new(fx.store.clone()),
            Arc::new(fx.cache.clone()),
            Duration::from_secs(3600),
        )
    }

    fn at_level(level: &str) -> DialogState {
        DialogState::new(vec![
            ActiveContext::new(ContextKind::SubjectSelection).with_param(param::SCHOOL_LEVEL, level)
        ])
    }

    fn at_subject(level: &str, subject: &str) -> DialogState {
        DialogState::new(vec![ActiveContext::new(ContextKind::LessonSelection)
            .with_param(param::SCHOOL_LEVEL, level)
            .with_param(param::SUBJECT_NAME, subject)])
    }

    #[tokio::test]
    async fn level_from_chip_text_lists_subjects() {
        let fx = Fixture::new();
        let reply = navigator(&fx)
            .select_level("Jenjang SD", &HashMap::new(), &DialogState::default())
            .await
            .unwrap();

        assert_eq!(reply.texts(), vec!["Berikut pelajaran untuk jenjang SD yang tersedia:"]);
        assert_eq!(reply.chips(), vec!["Matematika", "IPA"]);
        assert_eq!(reply.contexts.len(), 1);
        assert_eq!(reply.contexts[0].kind, ContextKind::SubjectSelection);
        assert_eq!(reply.contexts[0].parameters[param::SCHOOL_LEVEL], "sd");
    }

    #[tokio::test]
    async fn level_parameter_wins_over_query_text() {
        let fx = Fixture::new();
        let mut params = HashMap::new();
        params.insert(param::SCHOOL_LEVEL.to_string(), Value::from("smp"));

        let reply = navigator(&fx)
            .select_level("Jenjang SD", &params, &DialogState::default())
            .await
            .unwrap();

        assert_eq!(reply.chips(), vec!["Fisika"]);
    }

    #[tokio::test]
    async fn unknown_level_reprompts() {
        let fx = Fixture::new();
        let reply = navigator(&fx)
            .select_level("kuliah", &HashMap::new(), &DialogState::default())
            .await
            .unwrap();
        assert_eq!(reply, level_reprompt());
    }

    #[tokio::test]
    async fn level_without_subjects_reprompts_with_notice() {
        let fx = Fixture::new();
        let reply = navigator(&fx)
            .select_level("Jenjang SMA", &HashMap::new(), &DialogState::default())
            .await
            .unwrap();

        assert_eq!(
            reply.texts(),
            vec![
                "❗ Belum ada pelajaran untuk jenjang SMA.\n\
                 👋 Silakan pilih ulang jenjang pendidikan terlebih dahulu:"
            ]
        );
        assert!(reply.contexts.is_empty());
    }

    #[tokio::test]
    async fn subject_with_two_lessons_advances_stage() {
        let fx = Fixture::new();
        let reply = navigator(&fx)
            .select_subject("Matematika", &at_level("sd"))
            .await
            .unwrap();

        assert_eq!(reply.chips(), vec!["Pecahan", "Geometri"]);
        let ctx = &reply.contexts[0];
        assert_eq!(ctx.kind, ContextKind::LessonSelection);
        assert_eq!(ctx.parameters[param::SUBJECT_NAME], "Matematika");
        assert_eq!(ctx.parameters[param::SCHOOL_LEVEL], "sd");
    }

    #[tokio::test]
    async fn subject_without_level_reprompts_for_level() {
        let fx = Fixture::new();
        let reply = navigator(&fx)
            .select_subject("Matematika", &DialogState::default())
            .await
            .unwrap();
        assert_eq!(reply, level_reprompt());
    }

    #[tokio::test]
    async fn unknown_subject_lists_siblings_and_keeps_stage() {
        let fx = Fixture::new();
        let reply = navigator(&fx)
            .select_subject("Sejarah", &at_level("sd"))
            .await
            .unwrap();

        assert!(reply.texts()[0]
            .starts_with("❗ Pelajaran 'Sejarah' tidak ditemukan untuk jenjang SD."));
        assert_eq!(reply.chips(), vec!["Matematika", "IPA"]);
        assert_eq!(reply.contexts[0].kind, ContextKind::SubjectSelection);
    }

    #[tokio::test]
    async fn subject_without_lessons_lists_siblings_with_note() {
        let fx = Fixture::new();
        let reply = navigator(&fx).select_subject("IPA", &at_level("sd")).await.unwrap();

        assert!(reply.texts()[0].starts_with("❗ Belum ada materi untuk IPA jenjang SD."));
        assert_eq!(reply.contexts[0].kind, ContextKind::SubjectSelection);
    }

    #[tokio::test]
    async fn lesson_listing_is_cached_without_contexts() {
        let fx = Fixture::new();
        let nav = navigator(&fx);
        nav.select_subject("Matematika", &at_level("sd")).await.unwrap();

        let raw = fx
            .cache
            .get(&CacheKey::lessons(SchoolLevel::Sd, "Matematika"))
            .await
            .unwrap()
            .expect("listing cached");
        let cached: Fulfillment = serde_json::from_str(&raw).unwrap();
        assert!(cached.contexts.is_empty());
        assert_eq!(cached.chips(), vec!["Pecahan", "Geometri"]);
    }

    #[tokio::test]
    async fn cached_listing_is_served_without_store() {
        let fx = Fixture::new();
        let nav = navigator(&fx);
        nav.select_subject("Matematika", &at_level("sd")).await.unwrap();

        fx.store.set_failing(true);
        let reply = nav.select_subject("Matematika", &at_level("sd")).await.unwrap();

        assert_eq!(reply.chips(), vec!["Pecahan", "Geometri"]);
        assert_eq!(reply.contexts[0].kind, ContextKind::LessonSelection);
    }

    #[tokio::test]
    async fn cache_outage_falls_back_to_store() {
        let fx = Fixture::new();
        fx.cache.set_failing(true);
        let reply = navigator(&fx)
            .select_subject("Matematika", &at_level("sd"))
            .await
            .unwrap();
        assert_eq!(reply.chips(), vec!["Pecahan", "Geometri"]);
    }

    #[tokio::test]
    async fn lesson_hit_lists_subbabs_carrying_selections() {
        let fx = Fixture::new();
        let reply = navigator(&fx)
            .select_lesson("Pecahan", &at_subject("sd", "Matematika"))
            .await
            .unwrap();

        assert_eq!(reply.texts(), vec!["Berikut sub-bab dari Pecahan:"]);
        assert_eq!(reply.chips(), vec!["Penjumlahan Pecahan", "Pecahan Senilai"]);
        let ctx = &reply.contexts[0];
        assert_eq!(ctx.kind, ContextKind::SubbabSelection);
        assert_eq!(ctx.parameters[param::LESSON_NAME], "Pecahan");
        assert_eq!(ctx.parameters[param::SUBJECT_NAME], "Matematika");
        assert_eq!(ctx.parameters[param::SCHOOL_LEVEL], "sd");
    }

    #[tokio::test]
    async fn unknown_lesson_lists_all_lessons_of_subject() {
        let fx = Fixture::new();
        let reply = navigator(&fx)
            .select_lesson("Aljabar", &at_subject("sd", "Matematika"))
            .await
            .unwrap();

        assert!(reply.texts()[0]
            .starts_with("❗ Materi 'Aljabar' tidak ditemukan untuk pelajaran Matematika."));
        assert_eq!(reply.chips(), vec!["Pecahan", "Geometri"]);
        assert_eq!(reply.contexts.len(), 1);
        assert_eq!(reply.contexts[0].kind, ContextKind::LessonSelection);
    }

    #[tokio::test]
    async fn lesson_without_context_falls_back_to_previous_step() {
        let fx = Fixture::new();
        let reply = navigator(&fx)
            .select_lesson("Pecahan", &at_level("sd"))
            .await
            .unwrap();

        assert_eq!(reply.chips(), vec!["Matematika", "IPA"]);
        assert_eq!(reply.contexts[0].kind, ContextKind::SubjectSelection);
    }

    #[tokio::test]
    async fn lesson_without_any_context_reprompts_level() {
        let fx = Fixture::new();
        let reply = navigator(&fx)
            .select_lesson("Pecahan", &DialogState::default())
            .await
            .unwrap();
        assert_eq!(reply, level_reprompt());
    }

    #[tokio::test]
    async fn store_failure_without_history_is_flat_error() {
        let fx = Fixture::new();
        fx.store.set_failing(true);
        let reply = navigator(&fx)
            .select_level("Jenjang SD", &HashMap::new(), &DialogState::default())
            .await
            .unwrap();
        assert_eq!(reply, Fulfillment::text(messages::GENERIC_ERROR));
    }
}
