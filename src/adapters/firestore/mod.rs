//! Curriculum store adapters.

mod client;
mod curriculum_store;
mod in_memory;

pub use client::{parse_run_query_response, Document, FirestoreClient, StructuredQuery};
pub use curriculum_store::FirestoreCurriculumStore;
pub use in_memory::InMemoryCurriculumStore;
