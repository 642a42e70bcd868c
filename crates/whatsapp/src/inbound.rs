//! Webhook payload types for the WhatsApp Cloud API and normalization of
//! incoming messages into engine events.
//!
//! The provider delivers batches: a body holds entries, each entry holds
//! changes, and a change on the `messages` field carries zero or more
//! messages and zero or more delivery-status updates. Only messages reach
//! the flow engine; statuses are logged by the caller.

use serde::Deserialize;
use tracing::debug;

use angebot_core::{InboundEvent, UserInput};

pub const WEBHOOK_OBJECT: &str = "whatsapp_business_account";
pub const MESSAGES_FIELD: &str = "messages";

#[derive(Clone, Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<RawMessage>,
    #[serde(default)]
    pub statuses: Vec<DeliveryStatus>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub display_phone_number: Option<String>,
    #[serde(default)]
    pub phone_number_id: Option<String>,
}

/// A delivery-status update for a previously sent message. Logged only.
#[derive(Clone, Debug, Deserialize)]
pub struct DeliveryStatus {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub recipient_id: Option<String>,
}

/// One raw inbound message, any of the shapes the platform delivers.
#[derive(Clone, Debug, Deserialize)]
pub struct RawMessage {
    pub from: String,
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextPayload>,
    #[serde(default)]
    pub interactive: Option<InteractivePayload>,
    #[serde(default)]
    pub button: Option<ButtonPayload>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TextPayload {
    pub body: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct InteractivePayload {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub button_reply: Option<SelectionPayload>,
    #[serde(default)]
    pub list_reply: Option<SelectionPayload>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SelectionPayload {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Legacy quick-reply button, delivered as its visible text.
#[derive(Clone, Debug, Deserialize)]
pub struct ButtonPayload {
    pub text: String,
    #[serde(default)]
    pub payload: Option<String>,
}

impl WebhookBody {
    pub fn is_whatsapp(&self) -> bool {
        self.object == WEBHOOK_OBJECT
    }
}

/// Maps a raw message to a normalized engine event. Unsupported message
/// types (media, location, ...) yield `None` and are skipped.
pub fn normalize(message: &RawMessage) -> Option<InboundEvent> {
    let input = match message.kind.as_str() {
        "text" => UserInput::text(message.text.as_ref()?.body.as_str()),
        "interactive" => {
            let interactive = message.interactive.as_ref()?;
            let selection =
                interactive.button_reply.as_ref().or(interactive.list_reply.as_ref())?;
            UserInput::selection(selection.id.as_str())
        }
        "button" => UserInput::text(message.button.as_ref()?.text.as_str()),
        other => {
            debug!(message_type = other, "skipping unsupported message type");
            return None;
        }
    };

    Some(InboundEvent {
        user_id: message.from.clone(),
        input,
        provider_message_id: message.id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use angebot_core::InputKind;

    fn body(value: serde_json::Value) -> WebhookBody {
        serde_json::from_value(value).expect("webhook body should deserialize")
    }

    fn entry_with_message(message: serde_json::Value) -> WebhookBody {
        body(serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "412747065246901",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "metadata": { "phone_number_id": "423598467493680" },
                        "messages": [message]
                    }
                }]
            }]
        }))
    }

    #[test]
    fn text_message_normalizes_to_free_text() {
        let body = entry_with_message(serde_json::json!({
            "from": "4917712345678",
            "id": "wamid.AAA",
            "type": "text",
            "text": { "body": "Hallo" }
        }));

        let message = &body.entry[0].changes[0].value.messages[0];
        let event = normalize(message).expect("text message should normalize");

        assert_eq!(event.user_id, "4917712345678");
        assert_eq!(event.provider_message_id, "wamid.AAA");
        assert_eq!(event.input.kind, InputKind::FreeText);
        assert_eq!(event.input.raw, "Hallo");
    }

    #[test]
    fn button_reply_normalizes_to_a_selection_id() {
        let body = entry_with_message(serde_json::json!({
            "from": "4917712345678",
            "id": "wamid.BBB",
            "type": "interactive",
            "interactive": {
                "type": "button_reply",
                "button_reply": { "id": "quote_bau", "title": "🏗️ Bauservice" }
            }
        }));

        let event = normalize(&body.entry[0].changes[0].value.messages[0])
            .expect("button reply should normalize");
        assert_eq!(event.input.kind, InputKind::Selection);
        assert_eq!(event.input.raw, "quote_bau");
    }

    #[test]
    fn list_reply_normalizes_to_a_selection_id() {
        let body = entry_with_message(serde_json::json!({
            "from": "4917712345678",
            "id": "wamid.CCC",
            "type": "interactive",
            "interactive": {
                "type": "list_reply",
                "list_reply": { "id": "smart_home", "title": "🏡 Smart Home" }
            }
        }));

        let event = normalize(&body.entry[0].changes[0].value.messages[0])
            .expect("list reply should normalize");
        assert_eq!(event.input.kind, InputKind::Selection);
        assert_eq!(event.input.raw, "smart_home");
    }

    #[test]
    fn legacy_quick_reply_button_normalizes_to_its_text() {
        let body = entry_with_message(serde_json::json!({
            "from": "4917712345678",
            "id": "wamid.DDD",
            "type": "button",
            "button": { "text": "📋 Angebot", "payload": "quote" }
        }));

        let event = normalize(&body.entry[0].changes[0].value.messages[0])
            .expect("legacy button should normalize");
        assert_eq!(event.input.kind, InputKind::FreeText);
        assert_eq!(event.input.raw, "📋 Angebot");
    }

    #[test]
    fn unsupported_message_types_are_skipped() {
        let body = entry_with_message(serde_json::json!({
            "from": "4917712345678",
            "id": "wamid.EEE",
            "type": "image"
        }));

        assert!(normalize(&body.entry[0].changes[0].value.messages[0]).is_none());
    }

    #[test]
    fn statuses_deserialize_alongside_messages() {
        let body = body(serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "changes": [{
                    "field": "messages",
                    "value": {
                        "statuses": [
                            { "id": "wamid.FFF", "status": "delivered", "recipient_id": "4917712345678" }
                        ]
                    }
                }]
            }]
        }));

        let value = &body.entry[0].changes[0].value;
        assert!(value.messages.is_empty());
        assert_eq!(value.statuses[0].status, "delivered");
    }

    #[test]
    fn non_whatsapp_objects_are_recognizable() {
        let body = body(serde_json::json!({ "object": "page", "entry": [] }));
        assert!(!body.is_whatsapp());
    }
}
