//! Fulfillment responses, independent of the Dialogflow wire format.

use serde::{Deserialize, Serialize};

use super::context::ContextUpdate;
use super::messages;

/// One rich message in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Message {
    Text(String),
    Chips(Vec<String>),
}

/// A webhook reply: flat text, rich messages and context updates.
///
/// Listings are cached in serialized form, so contexts are stripped with
/// [`Fulfillment::without_contexts`] before caching and reattached per request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfillment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<ContextUpdate>,
}

impl Fulfillment {
    /// Flat text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// A message followed by quick-reply chips.
    pub fn menu(message: impl Into<String>, chips: Vec<String>) -> Self {
        Self {
            text: None,
            messages: vec![Message::Text(message.into()), Message::Chips(chips)],
            contexts: Vec::new(),
        }
    }

    /// The generated-answer template with its follow-up chips.
    pub fn answer(answer: &str) -> Self {
        Self {
            text: None,
            messages: vec![
                Message::Text(format!("{}{}", messages::ANSWER_HEADER, answer)),
                Message::Text(messages::ANSWER_FOLLOW_UP.to_string()),
                Message::Chips(vec![
                    messages::CHIP_ASK_AGAIN.to_string(),
                    messages::CHIP_MAIN_MENU.to_string(),
                ]),
            ],
            contexts: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: ContextUpdate) -> Self {
        self.contexts.push(context);
        self
    }

    pub fn with_contexts(mut self, contexts: impl IntoIterator<Item = ContextUpdate>) -> Self {
        self.contexts.extend(contexts);
        self
    }

    /// Puts a notice line above the first text of the reply.
    pub fn with_notice(mut self, notice: &str) -> Self {
        if let Some(Message::Text(first)) = self
            .messages
            .iter_mut()
            .find(|m| matches!(m, Message::Text(_)))
        {
            *first = format!("{}\n{}", notice, first);
            return self;
        }
        match self.text.as_mut() {
            Some(text) => *text = format!("{}\n{}", notice, text),
            None if self.messages.is_empty() => self.text = Some(notice.to_string()),
            None => self.messages.insert(0, Message::Text(notice.to_string())),
        }
        self
    }

    pub fn without_contexts(&self) -> Self {
        Self {
            text: self.text.clone(),
            messages: self.messages.clone(),
            contexts: Vec::new(),
        }
    }

    /// Chip labels across all messages.
    pub fn chips(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::Chips(chips) => Some(chips),
                Message::Text(_) => None,
            })
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Every text line, flat text first.
    pub fn texts(&self) -> Vec<&str> {
        self.text
            .iter()
            .map(String::as_str)
            .chain(self.messages.iter().filter_map(|m| match m {
                Message::Text(t) => Some(t.as_str()),
                Message::Chips(_) => None,
            }))
            .collect()
    }
}
