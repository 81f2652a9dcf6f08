//! Domain layer: curriculum entities and the conversation model.

pub mod curriculum;
pub mod dialog;
pub mod foundation;
