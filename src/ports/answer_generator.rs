//! Answer Generator Port - Interface to the generative text API.
//!
//! A generator takes a single prompt and returns plain text. Every failure is
//! recoverable and maps onto an apology the student can read.

use async_trait::async_trait;

use crate::domain::dialog::messages;

/// Port for generating an answer from a prompt.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generates an answer for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns `AIError::EmptyPrompt` for blank input without calling out.
    async fn generate(&self, prompt: &str) -> Result<String, AIError>;

    /// Short provider name for logs.
    fn name(&self) -> &str;
}

/// Generation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AIError {
    /// The prompt was empty after trimming.
    #[error("empty prompt")]
    EmptyPrompt,

    /// No API key is configured.
    #[error("generator not configured")]
    NotConfigured,

    /// The request exceeded its deadline.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not have the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// The API answered with a non-success status.
    #[error("upstream returned status {status}: {message}")]
    Upstream { status: u16, message: String },
}

impl AIError {
    /// The message shown to the student for this failure.
    pub fn apology(&self) -> &'static str {
        match self {
            AIError::EmptyPrompt => messages::EMPTY_QUESTION,
            AIError::NotConfigured => messages::AI_NOT_CONFIGURED,
            AIError::Timeout { .. } => messages::BUSY,
            AIError::Network(_) => messages::AI_NETWORK,
            AIError::Parse(_) => messages::AI_PARSE,
            AIError::Upstream { .. } => messages::GENERIC_ERROR,
        }
    }
}
