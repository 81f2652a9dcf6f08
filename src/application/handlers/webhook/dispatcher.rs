//! WebhookDispatcher - routes one Dialogflow call to its handler.
//!
//! The dispatcher is the failure boundary: handler errors and panics are
//! logged here and turned into the generic apology, so a well-formed webhook
//! request always gets a fulfillment.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use tracing::Instrument;

use super::custom_question::CustomQuestionHandler;
use super::menu::MenuNavigator;
use super::theory::TheoryHandler;
use super::welcome::welcome;
use super::{CacheTtls, HandlerError};
use crate::domain::dialog::{messages, ContextKind, DialogState, Fulfillment, Intent};
use crate::ports::{CurriculumStore, GenerationQueue, ResponseCache};

/// One decoded webhook call.
#[derive(Debug, Clone, Default)]
pub struct WebhookCall {
    /// Intent display name as matched by the agent.
    pub intent: String,
    pub query_text: String,
    pub session: String,
    /// Parameters extracted by the intent itself.
    pub parameters: HashMap<String, Value>,
    pub dialog: DialogState,
}

pub struct WebhookDispatcher {
    menu: Arc<MenuNavigator>,
    theory: TheoryHandler,
    questions: CustomQuestionHandler,
}

impl WebhookDispatcher {
    pub fn new(
        store: Arc<dyn CurriculumStore>,
        cache: Arc<dyn ResponseCache>,
        queue: Arc<dyn GenerationQueue>,
        ttls: CacheTtls,
    ) -> Self {
        let menu = Arc::new(MenuNavigator::new(store.clone(), cache.clone(), ttls.listing));
        Self {
            theory: TheoryHandler::new(
                store,
                cache.clone(),
                queue.clone(),
                menu.clone(),
                ttls.theory,
            ),
            questions: CustomQuestionHandler::new(cache, queue, ttls.question),
            menu,
        }
    }

    /// Fulfills the call. Never fails.
    pub async fn dispatch(&self, call: &WebhookCall) -> Fulfillment {
        let span = tracing::info_span!("webhook", intent = %call.intent, session = %call.session);

        let outcome = AssertUnwindSafe(self.route(call))
            .catch_unwind()
            .instrument(span.clone())
            .await;

        span.in_scope(|| match outcome {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Webhook handler failed");
                Fulfillment::text(messages::GENERIC_ERROR)
            }
            Err(panic) => {
                tracing::error!(panic = panic_message(&*panic), "Webhook handler panicked");
                Fulfillment::text(messages::GENERIC_ERROR)
            }
        })
    }

    async fn route(&self, call: &WebhookCall) -> Result<Fulfillment, HandlerError> {
        let query = call.query_text.as_str();
        let intent = Intent::from_display_name(&call.intent);
        tracing::info!(?intent, query_text = query, "Webhook call received");

        match intent {
            Some(Intent::Welcome) => Ok(welcome()),
            Some(Intent::SelectLevel) => {
                self.menu
                    .select_level(query, &call.parameters, &call.dialog)
                    .await
            }
            Some(Intent::SelectSubject) => self.menu.select_subject(query, &call.dialog).await,
            Some(Intent::SelectLesson) => self.menu.select_lesson(query, &call.dialog).await,
            Some(Intent::SelectSubbab) => self.theory.handle(query, &call.dialog).await,
            Some(Intent::AskAgain) => Ok(self.questions.ask_prompt()),
            Some(Intent::CustomQuestion) => Ok(self.questions.answer(&call.session, query).await),
            None if call.dialog.is_active(ContextKind::WaitingCustomAnswer)
                && !query.trim().is_empty() =>
            {
                tracing::info!("Unmatched intent while waiting for a question; answering it");
                Ok(self.questions.answer(&call.session, query).await)
            }
            None => {
                tracing::warn!("Intent not recognized");
                Ok(Fulfillment::text(messages::NOT_RECOGNIZED))
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
