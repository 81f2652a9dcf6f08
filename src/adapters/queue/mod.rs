//! Generation queue adapters.

mod channel;
mod inline;

pub use channel::{ChannelGenerationQueue, GenerationWorkerPool};
pub use inline::InlineGenerationQueue;
