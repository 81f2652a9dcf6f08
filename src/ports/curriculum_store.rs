//! Curriculum Store Port - Read-only access to curriculum documents.
//!
//! Lookups are equality queries on natural keys, chained by the caller:
//! level → subject (by name) → lessons (by `id_subject`) → subbabs (by lesson id).

use async_trait::async_trait;

use crate::domain::curriculum::{Lesson, SchoolLevel, Subbab, Subject};

/// Errors raised by curriculum lookups.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document store request timed out")]
    Timeout,

    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("document store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed document: {0}")]
    Malformed(String),
}

/// Port for curriculum lookups.
#[async_trait]
pub trait CurriculumStore: Send + Sync {
    /// All subjects offered at a level.
    async fn subjects_for_level(&self, level: SchoolLevel) -> Result<Vec<Subject>, StoreError>;

    /// The subject with this exact name at this level.
    async fn find_subject(
        &self,
        level: SchoolLevel,
        name: &str,
    ) -> Result<Option<Subject>, StoreError>;

    /// All lessons of a subject.
    async fn lessons_for_subject(&self, id_subject: &str) -> Result<Vec<Lesson>, StoreError>;

    /// The lesson with this exact title under the subject.
    async fn find_lesson(
        &self,
        id_subject: &str,
        title: &str,
    ) -> Result<Option<Lesson>, StoreError>;

    /// All subbabs of a lesson.
    async fn subbabs_for_lesson(&self, lesson_id: &str) -> Result<Vec<Subbab>, StoreError>;

    /// The first subbab with this exact title.
    async fn find_subbab(&self, title: &str) -> Result<Option<Subbab>, StoreError>;
}
