//! WhatsApp Cloud API client.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info};

use angebot_core::config::WhatsAppConfig;
use angebot_core::{CollaboratorError, MessageSender, ReplyIntent};

use crate::error::{Result, WhatsAppError};
use crate::outbound::{self, OutboundMessage};

#[derive(Clone)]
pub struct WhatsAppClient {
    client: Client,
    access_token: SecretString,
    messages_url: String,
}

#[derive(Debug, Serialize)]
struct ReadReceipt {
    messaging_product: &'static str,
    status: &'static str,
    message_id: String,
}

impl WhatsAppClient {
    pub fn new(config: &WhatsAppConfig) -> Self {
        let messages_url = format!(
            "{}/{}/{}/messages",
            config.graph_base_url.trim_end_matches('/'),
            config.api_version,
            config.phone_number_id
        );

        Self { client: Client::new(), access_token: config.access_token.clone(), messages_url }
    }

    pub async fn send(&self, payload: &OutboundMessage) -> Result<()> {
        self.post(payload).await?;
        info!(
            event_name = "whatsapp.message_sent",
            to = %payload.to,
            "message delivered to the Cloud API"
        );
        Ok(())
    }

    pub async fn send_text(&self, to: &str, body: &str) -> Result<()> {
        self.send(&outbound::render(to, &ReplyIntent::text(body))).await
    }

    pub async fn send_template(&self, to: &str, name: &str, language_code: &str) -> Result<()> {
        self.send(&outbound::render_template(to, name, language_code)).await
    }

    /// Acknowledges an inbound message with a read receipt. Best-effort;
    /// callers log and continue on failure.
    pub async fn mark_read(&self, message_id: &str) -> Result<()> {
        let receipt = ReadReceipt {
            messaging_product: "whatsapp",
            status: "read",
            message_id: message_id.to_string(),
        };
        self.post(&receipt).await?;
        debug!(message_id, "inbound message marked as read");
        Ok(())
    }

    async fn post<T: Serialize>(&self, payload: &T) -> Result<()> {
        let response = self
            .client
            .post(&self.messages_url)
            .bearer_auth(self.access_token.expose_secret())
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(WhatsAppError::Api { status, body });
        }

        Ok(())
    }
}

#[async_trait]
impl MessageSender for WhatsAppClient {
    async fn deliver(
        &self,
        user_id: &str,
        reply: &ReplyIntent,
    ) -> std::result::Result<(), CollaboratorError> {
        self.send(&outbound::render(user_id, reply))
            .await
            .map_err(|error| CollaboratorError::Delivery(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WhatsAppConfig {
        WhatsAppConfig {
            access_token: "EAAG-test".to_string().into(),
            phone_number_id: "423598467493680".to_string(),
            verify_token: "verify-test".to_string().into(),
            api_version: "v21.0".to_string(),
            graph_base_url: "https://graph.facebook.com".to_string(),
        }
    }

    #[test]
    fn messages_url_is_built_from_version_and_phone_number_id() {
        let client = WhatsAppClient::new(&config());
        assert_eq!(
            client.messages_url,
            "https://graph.facebook.com/v21.0/423598467493680/messages"
        );
    }

    #[test]
    fn trailing_slash_in_base_url_is_tolerated() {
        let client = WhatsAppClient::new(&WhatsAppConfig {
            graph_base_url: "https://graph.facebook.com/".to_string(),
            ..config()
        });
        assert_eq!(
            client.messages_url,
            "https://graph.facebook.com/v21.0/423598467493680/messages"
        );
    }

    #[test]
    fn read_receipt_serializes_the_expected_shape() {
        let receipt = ReadReceipt {
            messaging_product: "whatsapp",
            status: "read",
            message_id: "wamid.AAA".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&receipt).expect("serialize"),
            serde_json::json!({
                "messaging_product": "whatsapp",
                "status": "read",
                "message_id": "wamid.AAA"
            })
        );
    }
}
