//! HubSpot CRM connector.
//!
//! Lookup-or-create contact upserts keyed by the user's phone number, plus
//! consent updates. An existing contact is returned as-is; collected fields
//! only flow into newly created records, matching the lead-capture
//! semantics of the intake flow.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use angebot_core::config::HubspotConfig;
use angebot_core::{CollaboratorError, ContactFields, CrmConnector};

const CONTACTS_PATH: &str = "/crm/v3/objects/contacts";

pub struct HubspotConnector {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total: i64,
    #[serde(default)]
    results: Vec<ContactRecord>,
}

#[derive(Debug, Deserialize)]
struct ContactRecord {
    id: String,
}

impl HubspotConnector {
    /// Returns `None` when the connector is disabled or unconfigured; the
    /// caller falls back to a no-op connector.
    pub fn try_new(config: &HubspotConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let api_key = config.api_key.clone()?;

        Some(Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn search(&self, phone: &str) -> Result<Option<String>, CollaboratorError> {
        let response = self
            .client
            .post(format!("{}{}/search", self.base_url, CONTACTS_PATH))
            .bearer_auth(self.api_key.expose_secret())
            .json(&search_payload(phone))
            .send()
            .await
            .map_err(crm_error)?;

        let response = check_status(response).await?;
        let search: SearchResponse = response.json().await.map_err(crm_error)?;

        if search.total > 0 {
            Ok(search.results.into_iter().next().map(|record| record.id))
        } else {
            Ok(None)
        }
    }

    async fn create(
        &self,
        phone: &str,
        fields: &ContactFields,
    ) -> Result<String, CollaboratorError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, CONTACTS_PATH))
            .bearer_auth(self.api_key.expose_secret())
            .json(&json!({ "properties": contact_properties(phone, fields) }))
            .send()
            .await
            .map_err(crm_error)?;

        let response = check_status(response).await?;
        let record: ContactRecord = response.json().await.map_err(crm_error)?;

        info!(
            event_name = "crm.contact_created",
            contact_id = %record.id,
            "hubspot contact created"
        );
        Ok(record.id)
    }
}

#[async_trait]
impl CrmConnector for HubspotConnector {
    async fn upsert_contact(
        &self,
        user_id: &str,
        fields: &ContactFields,
    ) -> Result<String, CollaboratorError> {
        match self.search(user_id).await? {
            Some(contact_id) => Ok(contact_id),
            None => self.create(user_id, fields).await,
        }
    }

    async fn set_consent(
        &self,
        contact_id: &str,
        granted: bool,
        legal_basis: &str,
    ) -> Result<(), CollaboratorError> {
        let response = self
            .client
            .patch(format!("{}{}/{}", self.base_url, CONTACTS_PATH, contact_id))
            .bearer_auth(self.api_key.expose_secret())
            .json(&json!({ "properties": consent_properties(granted, legal_basis, Utc::now()) }))
            .send()
            .await
            .map_err(crm_error)?;

        check_status(response).await?;
        info!(
            event_name = "crm.consent_updated",
            contact_id = %contact_id,
            granted,
            "hubspot consent updated"
        );
        Ok(())
    }
}

fn search_payload(phone: &str) -> Value {
    json!({
        "filterGroups": [{
            "filters": [{
                "propertyName": "phone",
                "operator": "EQ",
                "value": phone
            }]
        }]
    })
}

fn contact_properties(phone: &str, fields: &ContactFields) -> Value {
    let mut map = serde_json::Map::new();
    map.insert("phone".to_string(), json!(phone));
    map.insert("whatsapp_number".to_string(), json!(phone));
    map.insert("lifecyclestage".to_string(), json!("lead"));
    map.insert("hs_lead_status".to_string(), json!("NEW"));
    map.insert("lead_source".to_string(), json!("WhatsApp"));

    if let Some(first_name) = &fields.first_name {
        map.insert("firstname".to_string(), json!(first_name));
    }
    if let Some(email) = &fields.email {
        map.insert("email".to_string(), json!(email));
    }
    if let Some(service_interest) = &fields.service_interest {
        map.insert("service_interest".to_string(), json!(service_interest));
    }
    if let Some(project_details) = &fields.project_details {
        map.insert("project_details".to_string(), json!(project_details));
    }
    if let Some(lead_status) = &fields.lead_status {
        map.insert("hs_lead_status".to_string(), json!(lead_status));
    }

    Value::Object(map)
}

fn consent_properties(granted: bool, legal_basis: &str, at: DateTime<Utc>) -> Value {
    json!({
        "whatsapp_consent": if granted { "true" } else { "false" },
        "whatsapp_consent_date": at.to_rfc3339(),
        "whatsapp_consent_legal_basis": legal_basis
    })
}

fn crm_error(error: reqwest::Error) -> CollaboratorError {
    CollaboratorError::Crm(error.to_string())
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CollaboratorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(CollaboratorError::Crm(format!("{status} - {body}")))
}
