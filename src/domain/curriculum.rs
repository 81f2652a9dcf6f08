//! Curriculum entities read from the document store.
//!
//! The hierarchy is level (jenjang) → subject → lesson → subbab. The webhook
//! only ever reads these; they are owned by the curriculum admin tooling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Education level (jenjang), the top of the menu hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchoolLevel {
    /// Elementary school.
    Sd,
    /// Junior high school.
    Smp,
    /// Senior high school.
    Sma,
}

impl SchoolLevel {
    /// All levels in menu order.
    pub const ALL: [SchoolLevel; 3] = [SchoolLevel::Sd, SchoolLevel::Smp, SchoolLevel::Sma];

    /// Code stored in the document store and in context parameters.
    pub fn code(&self) -> &'static str {
        match self {
            SchoolLevel::Sd => "sd",
            SchoolLevel::Smp => "smp",
            SchoolLevel::Sma => "sma",
        }
    }

    /// Upper-case label shown to students.
    pub fn label(&self) -> &'static str {
        match self {
            SchoolLevel::Sd => "SD",
            SchoolLevel::Smp => "SMP",
            SchoolLevel::Sma => "SMA",
        }
    }

    /// Quick-reply chip label for this level.
    pub fn chip_label(&self) -> String {
        format!("Jenjang {}", self.label())
    }

    /// Parses a level from a chip label (`"Jenjang SD"`) or a bare code (`"sd"`).
    pub fn parse(input: &str) -> Option<Self> {
        let normalized = input.trim().to_lowercase();
        let code = normalized
            .strip_prefix("jenjang")
            .map(str::trim)
            .unwrap_or(&normalized);

        match code {
            "sd" => Some(SchoolLevel::Sd),
            "smp" => Some(SchoolLevel::Smp),
            "sma" => Some(SchoolLevel::Sma),
            _ => None,
        }
    }
}

impl fmt::Display for SchoolLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A subject offered at one school level.
///
/// Lessons reference subjects through `id_subject`, a stored field that is
/// distinct from the store's native document id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id_subject: String,
    pub name: String,
    pub school_level: String,
}

/// A lesson (materi) belonging to a subject, keyed by its native document id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub id_subject: String,
}

/// A sub-chapter, the leaf unit whose content grounds generated explanations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subbab {
    pub title: String,
    pub lesson_id: String,
    pub content: String,
}
