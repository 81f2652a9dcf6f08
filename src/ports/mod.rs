//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the handlers and the outside world. Adapters implement these ports.
//!
//! - `CurriculumStore` - curriculum documents (Firestore)
//! - `ResponseCache` - listings and generated answers (Redis)
//! - `AnswerGenerator` - generative text API (Gemini)
//! - `GenerationQueue` - deferred generation (in-process channel)

mod answer_generator;
mod curriculum_store;
mod generation_queue;
mod response_cache;

pub use answer_generator::{AIError, AnswerGenerator};
pub use curriculum_store::{CurriculumStore, StoreError};
pub use generation_queue::{GenerationJob, GenerationQueue, JobKind, QueueError};
pub use response_cache::{CacheError, ResponseCache};
