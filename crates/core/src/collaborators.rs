//! Contracts for the engine's external collaborators. The core depends on
//! these traits only; provider crates supply the implementations.

use async_trait::async_trait;
use thiserror::Error;

use crate::intents::{ContactFields, ReplyIntent};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("message delivery failed: {0}")]
    Delivery(String),
    #[error("crm request failed: {0}")]
    Crm(String),
}

/// Renders a reply intent into provider-specific payloads and delivers it.
/// Choice-label truncation to transport limits happens behind this trait.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn deliver(&self, user_id: &str, reply: &ReplyIntent) -> Result<(), CollaboratorError>;
}

/// Lookup-or-create contact upserts and consent updates. Searches by the
/// user identifier first; creates with default lifecycle/lead fields only
/// when absent.
#[async_trait]
pub trait CrmConnector: Send + Sync {
    async fn upsert_contact(
        &self,
        user_id: &str,
        fields: &ContactFields,
    ) -> Result<String, CollaboratorError>;

    async fn set_consent(
        &self,
        contact_id: &str,
        granted: bool,
        legal_basis: &str,
    ) -> Result<(), CollaboratorError>;
}

/// Drops every reply. Used when no transport is wired, and in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMessageSender;

#[async_trait]
impl MessageSender for NoopMessageSender {
    async fn deliver(&self, _user_id: &str, _reply: &ReplyIntent) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// Accepts every CRM intent without talking to a CRM. Wired when the
/// connector is disabled by configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCrmConnector;

#[async_trait]
impl CrmConnector for NoopCrmConnector {
    async fn upsert_contact(
        &self,
        user_id: &str,
        _fields: &ContactFields,
    ) -> Result<String, CollaboratorError> {
        Ok(format!("noop-{user_id}"))
    }

    async fn set_consent(
        &self,
        _contact_id: &str,
        _granted: bool,
        _legal_basis: &str,
    ) -> Result<(), CollaboratorError> {
        Ok(())
    }
}
