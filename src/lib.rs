//! LearnAble Chatbot - Dialogflow fulfillment webhook
//!
//! Guides deaf and hard-of-hearing students through a curriculum menu
//! (level → subject → lesson → subbab) stored in Firestore, and explains the
//! chosen subbab, or answers a free-text question, with Gemini. Generated
//! answers are produced by background workers and cached in Redis; the client
//! polls for them.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
