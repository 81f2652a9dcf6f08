//! Route configuration for the webhook endpoints.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use super::handlers::{check_answer, flush_cache, fulfill, health, WebhookAppState};
use crate::adapters::http::middleware::{require_admin, AdminGuard};

/// Public routes.
///
/// - `POST /webhook` - Dialogflow fulfillment
/// - `GET /check-gemini-result?cache_key=` - poll a deferred answer
/// - `GET /health` - liveness
pub fn webhook_router() -> Router<WebhookAppState> {
    Router::new()
        .route("/webhook", post(fulfill))
        .route("/check-gemini-result", get(check_answer))
        .route("/health", get(health))
}

/// Admin routes, behind the bearer token check.
///
/// - `GET /admin/flush-cache` - flush the response cache
pub fn admin_router(guard: Arc<AdminGuard>) -> Router<WebhookAppState> {
    Router::new()
        .route("/admin/flush-cache", get(flush_cache))
        .route_layer(middleware::from_fn_with_state(guard, require_admin))
}
