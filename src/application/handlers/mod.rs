//! Application handlers.
//!
//! Intent handlers for the Dialogflow fulfillment webhook.

pub mod webhook;
