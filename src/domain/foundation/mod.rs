//! Foundation module - Shared domain primitives.
//!
//! Identifiers shared by the dialog and queue layers.

mod ids;

pub use ids::JobId;
