//! Webhook intake and the administrative send endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use angebot_core::{EventContext, Processor};
use angebot_whatsapp::api::WhatsAppClient;
use angebot_whatsapp::inbound::{self, WebhookBody, MESSAGES_FIELD};

#[derive(Clone)]
pub struct AppState {
    pub verify_token: String,
    pub client: Arc<WhatsAppClient>,
    pub processor: Arc<Processor>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/whatsapp/webhook", get(verify_webhook).post(receive_webhook))
        .route("/api/whatsapp/send", post(send_message))
        .with_state(state)
}

/// Verification handshake: echo the challenge iff the static token matches.
async fn verify_webhook(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    let mode = params.get("hub.mode").map(String::as_str).unwrap_or_default();
    let token = params.get("hub.verify_token").map(String::as_str).unwrap_or_default();
    let challenge = params.get("hub.challenge").cloned().unwrap_or_default();

    if mode == "subscribe" && token == state.verify_token {
        info!(event_name = "webhook.verified", "webhook verification succeeded");
        (StatusCode::OK, challenge)
    } else {
        warn!(event_name = "webhook.verification_failed", "webhook verification failed");
        (StatusCode::FORBIDDEN, String::new())
    }
}

/// Event intake. Receipt is always acknowledged with 200; a payload missing
/// expected fields or a failing session store returns 500 and the provider
/// redelivers.
async fn receive_webhook(State(state): State<AppState>, Json(value): Json<Value>) -> StatusCode {
    let correlation_id = Uuid::new_v4().to_string();

    let body: WebhookBody = match serde_json::from_value(value) {
        Ok(body) => body,
        Err(source) => {
            error!(
                event_name = "webhook.malformed_payload",
                correlation_id = %correlation_id,
                error = %source,
                "webhook payload is missing expected fields"
            );
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    if !body.is_whatsapp() {
        return StatusCode::OK;
    }

    let ctx = EventContext::new(correlation_id);
    for entry in &body.entry {
        for change in &entry.changes {
            if change.field != MESSAGES_FIELD {
                continue;
            }

            for status in &change.value.statuses {
                info!(
                    event_name = "webhook.status_update",
                    correlation_id = %ctx.correlation_id,
                    message_id = %status.id,
                    status = %status.status,
                    "delivery status update"
                );
            }

            for message in &change.value.messages {
                if let Err(error) = state.client.mark_read(&message.id).await {
                    warn!(
                        event_name = "webhook.mark_read_failed",
                        correlation_id = %ctx.correlation_id,
                        message_id = %message.id,
                        error = %error,
                        "read receipt failed, continuing"
                    );
                }

                let Some(event) = inbound::normalize(message) else {
                    continue;
                };

                info!(
                    event_name = "webhook.message_received",
                    correlation_id = %ctx.correlation_id,
                    user_id = %event.user_id,
                    input_kind = ?event.input.kind,
                    "inbound message"
                );

                if let Err(error) = state.processor.process(&event, &ctx).await {
                    error!(
                        event_name = "webhook.processing_failed",
                        correlation_id = %ctx.correlation_id,
                        user_id = %event.user_id,
                        error = %error,
                        "event processing aborted"
                    );
                    return StatusCode::INTERNAL_SERVER_ERROR;
                }
            }
        }
    }

    StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct SendRequest {
    to: String,
    message: String,
    #[serde(rename = "type", default = "default_send_kind")]
    kind: String,
}

fn default_send_kind() -> String {
    "text".to_string()
}

#[derive(Debug, Serialize)]
struct SendResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Direct plain-text send, independent of the webhook flow.
async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<SendRequest>,
) -> (StatusCode, Json<SendResponse>) {
    if request.kind != "text" {
        return (
            StatusCode::BAD_REQUEST,
            Json(SendResponse { success: false, error: Some("invalid message type".to_string()) }),
        );
    }

    match state.client.send_text(&request.to, &request.message).await {
        Ok(()) => (StatusCode::OK, Json(SendResponse { success: true, error: None })),
        Err(error) => {
            error!(event_name = "send.failed", error = %error, "administrative send failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SendResponse { success: false, error: Some(error.to_string()) }),
            )
        }
    }
}
