//! Data Transfer Objects for the Dialogflow ES fulfillment webhook.
//!
//! These types mirror the Dialogflow v2 JSON shapes (camelCase) and translate
//! to and from the session-free [`WebhookCall`] and [`Fulfillment`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::application::handlers::webhook::{AnswerStatus, WebhookCall};
use crate::domain::dialog::{ActiveContext, ContextKind, DialogState, Fulfillment, Message};

// ════════════════════════════════════════════════════════════════════════════════
// Request
// ════════════════════════════════════════════════════════════════════════════════

/// Inbound `WebhookRequest`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    /// `projects/{project}/agent/sessions/{session}`.
    #[serde(default)]
    pub session: String,
    #[serde(default)]
    pub query_result: QueryResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub query_text: String,
    #[serde(default)]
    pub intent: Option<IntentRef>,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub output_contexts: Vec<ContextDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRef {
    #[serde(default)]
    pub display_name: String,
}

/// A context in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextDto {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifespan_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,
}

impl WebhookRequest {
    /// Decodes the call. Contexts the webhook does not own are dropped.
    pub fn into_call(self) -> WebhookCall {
        let query = self.query_result;
        let contexts = query
            .output_contexts
            .into_iter()
            .filter_map(|ctx| {
                let kind = ContextKind::from_wire_name(&ctx.name)?;
                Some(ActiveContext {
                    kind,
                    lifespan: ctx.lifespan_count,
                    parameters: ctx.parameters.into_iter().collect(),
                })
            })
            .collect();

        WebhookCall {
            intent: query.intent.map(|i| i.display_name).unwrap_or_default(),
            query_text: query.query_text,
            session: self.session,
            parameters: query.parameters.into_iter().collect(),
            dialog: DialogState::new(contexts),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response
// ════════════════════════════════════════════════════════════════════════════════

/// Outbound `WebhookResponse`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fulfillment_text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fulfillment_messages: Vec<FulfillmentMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub output_contexts: Vec<ContextDto>,
}

/// `{"text":{"text":[...]}}` or `{"payload":{"richContent":[...]}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentMessage {
    Text(TextBody),
    Payload(RichPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBody {
    pub text: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RichPayload {
    pub rich_content: Vec<Vec<RichContentItem>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichContentItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub options: Vec<ChipOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChipOption {
    pub text: String,
}

impl FulfillmentMessage {
    fn from_message(message: &Message) -> Self {
        match message {
            Message::Text(text) => FulfillmentMessage::Text(TextBody {
                text: vec![text.clone()],
            }),
            Message::Chips(chips) => FulfillmentMessage::Payload(RichPayload {
                rich_content: vec![vec![RichContentItem {
                    kind: "chips".to_string(),
                    options: chips
                        .iter()
                        .map(|text| ChipOption { text: text.clone() })
                        .collect(),
                }]],
            }),
        }
    }
}

fn messages_of(fulfillment: &Fulfillment) -> Vec<FulfillmentMessage> {
    fulfillment
        .messages
        .iter()
        .map(FulfillmentMessage::from_message)
        .collect()
}

impl WebhookResponse {
    /// Encodes a fulfillment, binding its contexts to `session`.
    pub fn from_fulfillment(fulfillment: Fulfillment, session: &str) -> Self {
        let output_contexts = fulfillment
            .contexts
            .iter()
            .map(|update| ContextDto {
                name: format!("{}/contexts/{}", session, update.kind.wire_name()),
                lifespan_count: Some(update.lifespan),
                parameters: update
                    .parameters
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            })
            .collect();

        Self {
            fulfillment_messages: messages_of(&fulfillment),
            fulfillment_text: fulfillment.text,
            output_contexts,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Answer polling
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerStatusQuery {
    pub cache_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerStatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fulfillment_messages: Vec<FulfillmentMessage>,
}

impl From<AnswerStatus> for AnswerStatusResponse {
    fn from(status: AnswerStatus) -> Self {
        match status {
            AnswerStatus::Ready(answer) => Self {
                status: "ready".to_string(),
                fulfillment_messages: messages_of(&answer),
            },
            AnswerStatus::Pending => Self {
                status: "pending".to_string(),
                fulfillment_messages: Vec::new(),
            },
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Admin / errors
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct FlushCacheResponse {
    pub status: String,
    pub message: String,
}

impl FlushCacheResponse {
    pub fn flushed() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Cache flushed".to_string(),
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            code: "UNAUTHORIZED".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dialog::{param, ContextUpdate};
    use serde_json::json;

    const SESSION: &str = "projects/learnable/agent/sessions/abc";

    #[test]
    fn request_decodes_known_contexts_only() {
        let body = json!({
            "session": SESSION,
            "queryResult": {
                "queryText": "Matematika",
                "intent": {"displayName": "Pilih Pelajaran"},
                "parameters": {"school_level": ""},
                "outputContexts": [
                    {
                        "name": format!("{}/contexts/pilihjenjang-followup", SESSION),
                        "lifespanCount": 4,
                        "parameters": {"school_level": "sd", "school_level.original": "SD"}
                    },
                    {"name": format!("{}/contexts/__system_counters__", SESSION)}
                ]
            }
        });

        let call = serde_json::from_value::<WebhookRequest>(body).unwrap().into_call();

        assert_eq!(call.intent, "Pilih Pelajaran");
        assert_eq!(call.query_text, "Matematika");
        assert_eq!(call.session, SESSION);
        assert_eq!(
            call.dialog.param(ContextKind::SubjectSelection, param::SCHOOL_LEVEL),
            Some("sd")
        );
        assert_eq!(call.dialog.any_param("school_level.original"), Some("SD"));
    }

    #[test]
    fn request_tolerates_missing_fields() {
        let call = serde_json::from_value::<WebhookRequest>(json!({}))
            .unwrap()
            .into_call();
        assert!(call.intent.is_empty());
        assert!(call.query_text.is_empty());
    }

    #[test]
    fn menu_response_uses_rich_chips_and_session_contexts() {
        let fulfillment = Fulfillment::menu("Pilih:", vec!["Matematika".into(), "IPA".into()])
            .with_context(
                ContextUpdate::new(ContextKind::LessonSelection, 5)
                    .with_param(param::SCHOOL_LEVEL, "sd"),
            );

        let response = WebhookResponse::from_fulfillment(fulfillment, SESSION);
        let value = serde_json::to_value(response).unwrap();

        assert_eq!(
            value,
            json!({
                "fulfillmentMessages": [
                    {"text": {"text": ["Pilih:"]}},
                    {"payload": {"richContent": [[{
                        "type": "chips",
                        "options": [{"text": "Matematika"}, {"text": "IPA"}]
                    }]]}}
                ],
                "outputContexts": [{
                    "name": format!("{}/contexts/pilihpelajaran-followup", SESSION),
                    "lifespanCount": 5,
                    "parameters": {"school_level": "sd"}
                }]
            })
        );
    }

    #[test]
    fn cleared_context_keeps_zero_lifespan_and_drops_parameters() {
        let fulfillment = Fulfillment::text("hi")
            .with_context(ContextUpdate::clear(ContextKind::WaitingCustomAnswer));

        let response = WebhookResponse::from_fulfillment(fulfillment, SESSION);
        let value = serde_json::to_value(response).unwrap();

        assert_eq!(value["fulfillmentText"], "hi");
        assert_eq!(value["outputContexts"][0]["lifespanCount"], 0);
        assert!(value["outputContexts"][0].get("parameters").is_none());
        assert!(value.get("fulfillmentMessages").is_none());
    }

    #[test]
    fn pending_status_has_no_messages() {
        let value =
            serde_json::to_value(AnswerStatusResponse::from(AnswerStatus::Pending)).unwrap();
        assert_eq!(value, json!({"status": "pending"}));
    }

    #[test]
    fn ready_status_carries_answer_template() {
        let value = serde_json::to_value(AnswerStatusResponse::from(AnswerStatus::Ready(
            Fulfillment::answer("42"),
        )))
        .unwrap();

        assert_eq!(value["status"], "ready");
        assert_eq!(value["fulfillmentMessages"][0]["text"]["text"][0], "🤖 Gemini Bot:\n42");
        assert_eq!(value["fulfillmentMessages"].as_array().unwrap().len(), 3);
    }
}
