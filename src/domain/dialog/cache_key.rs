//! Cache key derivation.
//!
//! Keys are pure functions of their inputs so the handler that schedules a
//! generation and the polling endpoint always agree. Generated answers live
//! under 64-character hex digests; listings use readable `kind:part` keys, so
//! the two never collide and a poll can only ever reach an answer.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::domain::curriculum::SchoolLevel;

const ANSWER_KEY_LEN: usize = 64;

/// A response cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Accepts a client-supplied key only if it has the shape of an answer
    /// key (lowercase sha256 hex).
    pub fn parse_answer(raw: &str) -> Option<Self> {
        let is_digest = raw.len() == ANSWER_KEY_LEN
            && raw.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        is_digest.then(|| Self(raw.to_string()))
    }

    /// Key of a grounded theory explanation: sha256 of `"{level}:{title}"`.
    pub fn theory_answer(level: SchoolLevel, subbab_title: &str) -> Self {
        Self::hashed(&format!("{}:{}", level.code(), subbab_title))
    }

    /// Key of a free-text question, scoped to its session.
    pub fn question_answer(session: &str, question: &str) -> Self {
        Self::hashed(&format!("{}:{}", session, question))
    }

    /// Colon-joined listing key, e.g. `lessons:sd:Matematika`.
    pub fn listing(kind: &str, parts: &[&str]) -> Self {
        let mut key = String::from(kind);
        for part in parts {
            key.push(':');
            key.push_str(part);
        }
        Self(key)
    }

    pub fn subjects(level: SchoolLevel) -> Self {
        Self::listing("subjects", &[level.code()])
    }

    pub fn lessons(level: SchoolLevel, subject: &str) -> Self {
        Self::listing("lessons", &[level.code(), subject])
    }

    pub fn subbabs(level: SchoolLevel, subject: &str, lesson: &str) -> Self {
        Self::listing("subbabs", &[level.code(), subject, lesson])
    }

    fn hashed(input: &str) -> Self {
        Self(format!("{:x}", Sha256::digest(input.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
