//! Conversation model: intents, contexts, menu stages and replies.

pub mod cache_key;
pub mod context;
pub mod fulfillment;
pub mod intent;
pub mod messages;
pub mod stage;

pub use cache_key::CacheKey;
pub use context::{param, ActiveContext, ContextKind, ContextUpdate, DialogState};
pub use fulfillment::{Fulfillment, Message};
pub use intent::Intent;
pub use stage::MenuStage;
