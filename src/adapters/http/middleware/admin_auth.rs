//! Bearer-token guard for admin endpoints.
//!
//! ```text
//! no token configured      → 404 (endpoint disabled)
//! missing or wrong token   → 401
//! matching token           → handler
//! ```
//!
//! Tokens are compared as SHA-256 digests in constant time, so neither the
//! content nor the length of the configured token leaks through timing.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::adapters::http::webhook::dto::ErrorResponse;

/// The configured admin token, if any.
pub struct AdminGuard {
    digest: Option<Secret<[u8; 32]>>,
}

impl AdminGuard {
    pub fn new(token: Option<&str>) -> Self {
        Self {
            digest: token
                .filter(|t| !t.is_empty())
                .map(|t| Secret::new(digest(t))),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.digest.is_some()
    }

    /// Constant-time comparison against the configured token.
    pub fn accepts(&self, presented: &str) -> bool {
        match &self.digest {
            Some(expected) => expected.expose_secret()[..].ct_eq(&digest(presented)[..]).into(),
            None => false,
        }
    }
}

impl std::fmt::Debug for AdminGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGuard")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Middleware enforcing [`AdminGuard`].
pub async fn require_admin(
    State(guard): State<Arc<AdminGuard>>,
    request: Request,
    next: Next,
) -> Response {
    if !guard.is_enabled() {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Admin endpoints are disabled")),
        )
            .into_response();
    }

    match bearer_token(request.headers()).map(|token| guard.accepts(token)) {
        Some(true) => next.run(request).await,
        presented => {
            tracing::warn!(
                path = %request.uri().path(),
                token_present = presented.is_some(),
                "Rejected admin request"
            );
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::unauthorized("Valid admin bearer token required")),
            )
                .into_response()
        }
    }
}
