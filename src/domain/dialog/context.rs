//! Conversation contexts.
//!
//! Dialogflow attaches named, expiring parameter bags to a session. Inbound
//! contexts arrive as [`ActiveContext`]; the webhook answers with
//! [`ContextUpdate`]s. Both are session-free: the HTTP boundary adds and strips
//! the `"{session}/contexts/"` prefix.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Lifespan given to menu stage contexts.
pub const MENU_CONTEXT_LIFESPAN: u32 = 5;

/// Lifespan of the context that waits for a generated theory answer.
pub const THEORY_WAIT_LIFESPAN: u32 = 3;

/// Lifespan of the context that waits for a free-text question.
pub const QUESTION_WAIT_LIFESPAN: u32 = 5;

/// Context parameter keys.
pub mod param {
    pub const SCHOOL_LEVEL: &str = "school_level";
    pub const SUBJECT_NAME: &str = "subject_name";
    pub const LESSON_NAME: &str = "lesson_name";
    pub const SUBBAB_NAME: &str = "subbab_name";
    pub const CACHE_KEY: &str = "cache_key";
}

/// Every context the webhook reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextKind {
    /// A level was chosen, a subject is expected next.
    SubjectSelection,
    /// A subject was chosen, a lesson is expected next.
    LessonSelection,
    /// A lesson was chosen, a subbab is expected next.
    SubbabSelection,
    /// The user asked to type a free-text question.
    WaitingCustomAnswer,
    /// A theory explanation is being generated.
    WaitingTheoryAnswer,
}

impl ContextKind {
    pub const ALL: [ContextKind; 5] = [
        ContextKind::WaitingCustomAnswer,
        ContextKind::SubjectSelection,
        ContextKind::LessonSelection,
        ContextKind::SubbabSelection,
        ContextKind::WaitingTheoryAnswer,
    ];

    /// Context name as configured in the Dialogflow agent.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ContextKind::SubjectSelection => "pilihjenjang-followup",
            ContextKind::LessonSelection => "pilihpelajaran-followup",
            ContextKind::SubbabSelection => "pilihsubbab-followup",
            ContextKind::WaitingCustomAnswer => "waiting_custom_answer",
            ContextKind::WaitingTheoryAnswer => "waiting_theory_answer",
        }
    }

    /// Resolves a full context resource name
    /// (`projects/p/agent/sessions/s/contexts/pilihjenjang-followup`) or a bare
    /// context name. Dialogflow lower-cases context names, so matching ignores case.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        let short = name.rsplit('/').next().unwrap_or(name);
        ContextKind::ALL
            .into_iter()
            .find(|kind| kind.wire_name().eq_ignore_ascii_case(short))
    }
}

/// A context received with an inbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveContext {
    pub kind: ContextKind,
    pub lifespan: Option<u32>,
    pub parameters: HashMap<String, Value>,
}

impl ActiveContext {
    pub fn new(kind: ContextKind) -> Self {
        Self {
            kind,
            lifespan: None,
            parameters: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), Value::String(value.into()));
        self
    }

    pub fn with_lifespan(mut self, lifespan: u32) -> Self {
        self.lifespan = Some(lifespan);
        self
    }

    /// A context re-emitted with a zero lifespan no longer counts.
    pub fn is_live(&self) -> bool {
        self.lifespan != Some(0)
    }

    /// Non-empty string parameter, trimmed.
    pub fn param(&self, key: &str) -> Option<&str> {
        string_param(&self.parameters, key)
    }
}

/// Reads a non-empty string parameter from a Dialogflow parameter map.
pub fn string_param<'a>(parameters: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
    parameters
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// A context the webhook emits in its response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextUpdate {
    pub kind: ContextKind,
    pub lifespan: u32,
    pub parameters: BTreeMap<String, String>,
}

impl ContextUpdate {
    pub fn new(kind: ContextKind, lifespan: u32) -> Self {
        Self {
            kind,
            lifespan,
            parameters: BTreeMap::new(),
        }
    }

    /// Clears a context by re-emitting it with a zero lifespan.
    pub fn clear(kind: ContextKind) -> Self {
        Self::new(kind, 0)
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn is_cleared(&self) -> bool {
        self.lifespan == 0
    }
}

/// The set of contexts active for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogState {
    contexts: Vec<ActiveContext>,
}

impl DialogState {
    pub fn new(contexts: Vec<ActiveContext>) -> Self {
        Self { contexts }
    }

    /// The live context of the given kind, if any.
    pub fn get(&self, kind: ContextKind) -> Option<&ActiveContext> {
        self.contexts
            .iter()
            .find(|ctx| ctx.kind == kind && ctx.is_live())
    }

    pub fn is_active(&self, kind: ContextKind) -> bool {
        self.get(kind).is_some()
    }

    /// Parameter of a specific context.
    pub fn param(&self, kind: ContextKind, key: &str) -> Option<&str> {
        self.get(kind).and_then(|ctx| ctx.param(key))
    }

    /// First live context carrying the parameter, in the order received.
    pub fn any_param(&self, key: &str) -> Option<&str> {
        self.contexts
            .iter()
            .filter(|ctx| ctx.is_live())
            .find_map(|ctx| ctx.param(key))
    }
}
