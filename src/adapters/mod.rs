//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the handlers to external systems:
//! - `ai` - Gemini answer generator (and a mock)
//! - `cache` - Redis response cache (and an in-memory one)
//! - `firestore` - Firestore curriculum store (and an in-memory one)
//! - `queue` - in-process generation queue and worker pool
//! - `http` - axum routes, DTOs and middleware

pub mod ai;
pub mod cache;
pub mod firestore;
pub mod http;
pub mod queue;
