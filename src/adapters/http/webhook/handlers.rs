//! HTTP handlers for the fulfillment webhook, answer polling and cache admin.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::handlers::webhook::{
    AnswerStatusHandler, FlushCacheHandler, WebhookDispatcher,
};
use crate::domain::dialog::CacheKey;
use crate::ports::ResponseCache;

use super::dto::{
    AnswerStatusQuery, AnswerStatusResponse, ErrorResponse, FlushCacheResponse, WebhookRequest,
    WebhookResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct WebhookAppState {
    pub dispatcher: Arc<WebhookDispatcher>,
    pub cache: Arc<dyn ResponseCache>,
}

impl WebhookAppState {
    pub fn new(dispatcher: Arc<WebhookDispatcher>, cache: Arc<dyn ResponseCache>) -> Self {
        Self { dispatcher, cache }
    }

    pub fn answer_status_handler(&self) -> AnswerStatusHandler {
        AnswerStatusHandler::new(self.cache.clone())
    }

    pub fn flush_cache_handler(&self) -> FlushCacheHandler {
        FlushCacheHandler::new(self.cache.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhook - Dialogflow fulfillment
///
/// Any well-formed request gets a 200 with a fulfillment; handler failures
/// are already turned into apologies by the dispatcher.
pub async fn fulfill(
    State(state): State<WebhookAppState>,
    body: Result<Json<WebhookRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Rejected malformed webhook body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(rejection.body_text())),
            )
                .into_response();
        }
    };

    let call = request.into_call();
    let fulfillment = state.dispatcher.dispatch(&call).await;
    Json(WebhookResponse::from_fulfillment(fulfillment, &call.session)).into_response()
}

/// GET /check-gemini-result?cache_key=... - deferred answer status
pub async fn check_answer(
    State(state): State<WebhookAppState>,
    Query(query): Query<AnswerStatusQuery>,
) -> Response {
    let Some(raw) = query.cache_key.filter(|k| !k.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("cache_key is required")),
        )
            .into_response();
    };

    // Listing keys share the cache; only answer digests may be polled.
    let Some(key) = CacheKey::parse_answer(raw.trim()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("cache_key is not an answer key")),
        )
            .into_response();
    };

    let status = state.answer_status_handler().check(&key).await;
    Json(AnswerStatusResponse::from(status)).into_response()
}

/// GET /admin/flush-cache - drop every cached listing and answer
pub async fn flush_cache(State(state): State<WebhookAppState>) -> Response {
    match state.flush_cache_handler().handle().await {
        Ok(()) => Json(FlushCacheResponse::flushed()).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Cache flush failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("Cache flush failed")),
            )
                .into_response()
        }
    }
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}
