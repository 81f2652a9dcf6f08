//! In-memory curriculum store for tests and local development.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::curriculum::{Lesson, SchoolLevel, Subbab, Subject};
use crate::ports::{CurriculumStore, StoreError};

#[derive(Debug, Default)]
struct Fixture {
    subjects: Vec<Subject>,
    lessons: Vec<Lesson>,
    subbabs: Vec<Subbab>,
}

/// Curriculum store over in-memory fixtures.
///
/// ```ignore
/// let store = InMemoryCurriculumStore::new()
///     .with_subject(SchoolLevel::Sd, "mtk-sd", "Matematika")
///     .with_lesson("lsn-1", "mtk-sd", "Pecahan")
///     .with_subbab("lsn-1", "Penjumlahan Pecahan", "...");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryCurriculumStore {
    data: Arc<RwLock<Fixture>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryCurriculumStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject(self, level: SchoolLevel, id_subject: &str, name: &str) -> Self {
        self.edit(|f| {
            f.subjects.push(Subject {
                id_subject: id_subject.to_string(),
                name: name.to_string(),
                school_level: level.code().to_string(),
            })
        })
    }

    pub fn with_lesson(self, id: &str, id_subject: &str, title: &str) -> Self {
        self.edit(|f| {
            f.lessons.push(Lesson {
                id: id.to_string(),
                title: title.to_string(),
                id_subject: id_subject.to_string(),
            })
        })
    }

    pub fn with_subbab(self, lesson_id: &str, title: &str, content: &str) -> Self {
        self.edit(|f| {
            f.subbabs.push(Subbab {
                title: title.to_string(),
                lesson_id: lesson_id.to_string(),
                content: content.to_string(),
            })
        })
    }

    /// Makes every lookup fail with `StoreError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn edit(self, f: impl FnOnce(&mut Fixture)) -> Self {
        // Builders run before the store is shared, so the lock is uncontended.
        if let Ok(mut fixture) = self.data.try_write() {
            f(&mut fixture);
        }
        self
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CurriculumStore for InMemoryCurriculumStore {
    async fn subjects_for_level(&self, level: SchoolLevel) -> Result<Vec<Subject>, StoreError> {
        self.check()?;
        Ok(self
            .data
            .read()
            .await
            .subjects
            .iter()
            .filter(|s| s.school_level == level.code())
            .cloned()
            .collect())
    }

    async fn find_subject(
        &self,
        level: SchoolLevel,
        name: &str,
    ) -> Result<Option<Subject>, StoreError> {
        self.check()?;
        Ok(self
            .data
            .read()
            .await
            .subjects
            .iter()
            .find(|s| s.school_level == level.code() && s.name == name)
            .cloned())
    }

    async fn lessons_for_subject(&self, id_subject: &str) -> Result<Vec<Lesson>, StoreError> {
        self.check()?;
        Ok(self
            .data
            .read()
            .await
            .lessons
            .iter()
            .filter(|l| l.id_subject == id_subject)
            .cloned()
            .collect())
    }

    async fn find_lesson(
        &self,
        id_subject: &str,
        title: &str,
    ) -> Result<Option<Lesson>, StoreError> {
        self.check()?;
        Ok(self
            .data
            .read()
            .await
            .lessons
            .iter()
            .find(|l| l.id_subject == id_subject && l.title == title)
            .cloned())
    }

    async fn subbabs_for_lesson(&self, lesson_id: &str) -> Result<Vec<Subbab>, StoreError> {
        self.check()?;
        Ok(self
            .data
            .read()
            .await
            .subbabs
            .iter()
            .filter(|s| s.lesson_id == lesson_id)
            .cloned()
            .collect())
    }

    async fn find_subbab(&self, title: &str) -> Result<Option<Subbab>, StoreError> {
        self.check()?;
        Ok(self
            .data
            .read()
            .await
            .subbabs
            .iter()
            .find(|s| s.title == title)
            .cloned())
    }
}
