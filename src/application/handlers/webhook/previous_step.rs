//! Previous-step re-prompt.
//!
//! Rebuilds the chips of the deepest menu stage present in the request, so a
//! student who sends something unexpected lands back on the menu they were
//! looking at instead of an error.

use super::menu::{Listing, MenuNavigator};
use super::welcome::level_reprompt;
use crate::domain::dialog::{DialogState, Fulfillment, MenuStage};
use crate::ports::StoreError;

impl MenuNavigator {
    /// The menu for the deepest recoverable stage.
    ///
    /// Starts from the deepest complete stage in the request and walks up
    /// through its parents while listings come back empty. A subject stage
    /// without subjects yields the level re-prompt. Returns `None` when the
    /// request carries no complete stage at all.
    pub async fn previous_step(
        &self,
        dialog: &DialogState,
    ) -> Result<Option<Fulfillment>, StoreError> {
        let mut next = dialog.deepest_stage();

        while let Some(stage) = next {
            let listing = match &stage {
                MenuStage::SubbabSelection {
                    level,
                    subject,
                    lesson,
                } => self.subbab_listing(*level, subject, lesson).await?,
                MenuStage::LessonSelection { level, subject } => {
                    self.lesson_listing(*level, subject).await?
                }
                MenuStage::SubjectSelection { level } => self.subject_listing(*level).await?,
            };

            if let Listing::Found(menu) = listing {
                tracing::debug!(stage = ?stage.context_kind(), "Re-prompting previous step");
                return Ok(Some(menu.with_context(stage.to_context())));
            }
            next = stage.parent();
        }

        Ok(dialog.deepest_stage().map(|_| level_reprompt()))
    }
}
