//! Firestore-backed curriculum store.
//!
//! Collections and fields:
//! - `subjects`: `name`, `schoolLevel`, `idSubject`
//! - `lessons`: `title`, `idSubject` (keyed by document id)
//! - `sub_bab`: `title`, `lessonId`, `content`

use async_trait::async_trait;

use super::client::{Document, FirestoreClient, StructuredQuery};
use crate::domain::curriculum::{Lesson, SchoolLevel, Subbab, Subject};
use crate::ports::{CurriculumStore, StoreError};

const SUBJECTS: &str = "subjects";
const LESSONS: &str = "lessons";
const SUBBABS: &str = "sub_bab";

/// Curriculum store reading from Firestore.
pub struct FirestoreCurriculumStore {
    client: FirestoreClient,
}

impl FirestoreCurriculumStore {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    async fn query<T>(
        &self,
        query: StructuredQuery,
        convert: fn(&Document) -> Option<T>,
    ) -> Result<Vec<T>, StoreError> {
        let docs = self.client.run_query(&query).await?;
        let total = docs.len();
        let items: Vec<T> = docs.iter().filter_map(convert).collect();

        if items.len() < total {
            tracing::warn!(
                skipped = total - items.len(),
                ?query,
                "Skipped documents missing required fields"
            );
        }
        Ok(items)
    }
}

fn to_subject(doc: &Document) -> Option<Subject> {
    Some(Subject {
        id_subject: doc.string("idSubject")?,
        name: doc.string("name")?,
        school_level: doc.string("schoolLevel")?,
    })
}

fn to_lesson(doc: &Document) -> Option<Lesson> {
    Some(Lesson {
        id: doc.id.clone(),
        title: doc.string("title")?,
        id_subject: doc.string("idSubject")?,
    })
}

fn to_subbab(doc: &Document) -> Option<Subbab> {
    Some(Subbab {
        title: doc.string("title")?,
        lesson_id: doc.string("lessonId")?,
        content: doc.string("content").unwrap_or_default(),
    })
}

#[async_trait]
impl CurriculumStore for FirestoreCurriculumStore {
    async fn subjects_for_level(&self, level: SchoolLevel) -> Result<Vec<Subject>, StoreError> {
        let query = StructuredQuery::collection(SUBJECTS).where_eq("schoolLevel", level.code());
        self.query(query, to_subject).await
    }

    async fn find_subject(
        &self,
        level: SchoolLevel,
        name: &str,
    ) -> Result<Option<Subject>, StoreError> {
        let query = StructuredQuery::collection(SUBJECTS)
            .where_eq("name", name)
            .where_eq("schoolLevel", level.code())
            .limit(1);
        Ok(self.query(query, to_subject).await?.into_iter().next())
    }

    async fn lessons_for_subject(&self, id_subject: &str) -> Result<Vec<Lesson>, StoreError> {
        let query = StructuredQuery::collection(LESSONS).where_eq("idSubject", id_subject);
        self.query(query, to_lesson).await
    }

    async fn find_lesson(
        &self,
        id_subject: &str,
        title: &str,
    ) -> Result<Option<Lesson>, StoreError> {
        let query = StructuredQuery::collection(LESSONS)
            .where_eq("title", title)
            .where_eq("idSubject", id_subject)
            .limit(1);
        Ok(self.query(query, to_lesson).await?.into_iter().next())
    }

    async fn subbabs_for_lesson(&self, lesson_id: &str) -> Result<Vec<Subbab>, StoreError> {
        let query = StructuredQuery::collection(SUBBABS).where_eq("lessonId", lesson_id);
        self.query(query, to_subbab).await
    }

    async fn find_subbab(&self, title: &str) -> Result<Option<Subbab>, StoreError> {
        let query = StructuredQuery::collection(SUBBABS)
            .where_eq("title", title)
            .limit(1);
        Ok(self.query(query, to_subbab).await?.into_iter().next())
    }
}
