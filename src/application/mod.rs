//! Application layer - webhook handlers and the deferred generation job.
//!
//! Handlers orchestrate the ports; they never touch HTTP or wire formats.

pub mod generation;
pub mod handlers;

pub use generation::{run_generation_job, JobOutcome};
pub use handlers::webhook::{
    AnswerStatus, AnswerStatusHandler, CacheTtls, FlushCacheHandler, HandlerError, WebhookCall,
    WebhookDispatcher,
};
