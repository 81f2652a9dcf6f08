//! Webhook HTTP adapter.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::WebhookAppState;
pub use routes::{admin_router, webhook_router};
