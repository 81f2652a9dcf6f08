//! HTTP adapters - the axum server surface.
//!
//! [`build_router`] assembles the webhook, polling, admin and health routes
//! and wraps them in request tracing, a request timeout and CORS.

pub mod middleware;
pub mod webhook;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

pub use middleware::AdminGuard;
pub use webhook::{admin_router, webhook_router, WebhookAppState};

/// Builds the application router.
pub fn build_router(
    state: WebhookAppState,
    guard: Arc<AdminGuard>,
    server: &ServerConfig,
) -> Router {
    Router::new()
        .merge(webhook_router())
        .merge(admin_router(guard))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors_layer(server))
}

/// Permissive when no origins are configured; Dialogflow calls server-to-server.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(allow_origin)
}
