//! Welcome / main menu: reset every context and offer the level chips.

use crate::domain::curriculum::SchoolLevel;
use crate::domain::dialog::{messages, ContextKind, ContextUpdate, Fulfillment};

/// Chip labels for the three school levels.
pub fn level_chips() -> Vec<String> {
    SchoolLevel::ALL.iter().map(SchoolLevel::chip_label).collect()
}

/// Greeting with level chips; clears all known contexts.
pub fn welcome() -> Fulfillment {
    Fulfillment::menu(messages::WELCOME, level_chips())
        .with_contexts(ContextKind::ALL.into_iter().map(ContextUpdate::clear))
}

/// Asks for the level again. Carries no context.
pub fn level_reprompt() -> Fulfillment {
    Fulfillment::menu(messages::LEVEL_REPROMPT, level_chips())
}
