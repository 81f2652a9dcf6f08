//! HTTP middleware for axum.
//!
//! - `admin_auth` - bearer token guard for admin endpoints

pub mod admin_auth;

pub use admin_auth::{require_admin, AdminGuard};
