//! Dialogflow webhook handlers.
//!
//! One handler per intent family, composed by [`WebhookDispatcher`]. Handlers
//! work on [`DialogState`](crate::domain::dialog::DialogState) and return a
//! [`Fulfillment`](crate::domain::dialog::Fulfillment); the HTTP adapter owns
//! the wire format.

mod answer_status;
mod custom_question;
mod dispatcher;
mod flush_cache;
mod menu;
mod previous_step;
mod theory;
mod welcome;

pub use answer_status::{AnswerStatus, AnswerStatusHandler};
pub use custom_question::CustomQuestionHandler;
pub use dispatcher::{WebhookCall, WebhookDispatcher};
pub use flush_cache::FlushCacheHandler;
pub use menu::{Listing, MenuNavigator};
pub use theory::TheoryHandler;
pub use welcome::{level_chips, level_reprompt, welcome};

use std::time::Duration;

use crate::config::CacheConfig;
use crate::ports::{CacheError, QueueError, StoreError};

/// Failures a handler does not turn into a reply itself.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("curriculum store: {0}")]
    Store(#[from] StoreError),

    #[error("response cache: {0}")]
    Cache(#[from] CacheError),

    #[error("generation queue: {0}")]
    Queue(#[from] QueueError),
}

/// Expiry applied to each kind of cached response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub listing: Duration,
    pub theory: Duration,
    pub question: Duration,
}

impl From<&CacheConfig> for CacheTtls {
    fn from(config: &CacheConfig) -> Self {
        Self {
            listing: config.listing_ttl(),
            theory: config.theory_ttl(),
            question: config.question_ttl(),
        }
    }
}
