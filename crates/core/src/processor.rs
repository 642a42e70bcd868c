//! Per-event processing pipeline: read session → decide → write session →
//! execute intents.
//!
//! Intents run sequentially; collaborator failures are logged and the rest
//! of the event is handled best-effort. Only a session-store failure aborts
//! the event. No mutual exclusion is taken for two concurrent events from
//! the same user; the read-modify-write race is an accepted limitation.

use std::sync::Arc;

use tracing::{error, info};

use crate::collaborators::{CrmConnector, MessageSender};
use crate::engine::{Decision, FlowEngine, InboundEvent, SessionChange};
use crate::intents::CrmIntent;
use crate::session::{SessionStore, SessionStoreError};

/// Request-scoped metadata threaded through logging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl EventContext {
    pub fn new(correlation_id: impl Into<String>) -> Self {
        Self { correlation_id: correlation_id.into() }
    }
}

pub struct Processor {
    engine: FlowEngine,
    store: Arc<dyn SessionStore>,
    sender: Arc<dyn MessageSender>,
    crm: Arc<dyn CrmConnector>,
}

impl Processor {
    pub fn new(
        store: Arc<dyn SessionStore>,
        sender: Arc<dyn MessageSender>,
        crm: Arc<dyn CrmConnector>,
    ) -> Self {
        Self { engine: FlowEngine::new(), store, sender, crm }
    }

    pub async fn process(
        &self,
        event: &InboundEvent,
        ctx: &EventContext,
    ) -> Result<(), SessionStoreError> {
        let session = self.store.get(&event.user_id).await?;
        let decision = self.engine.handle(&event.user_id, &event.input, session);

        info!(
            event_name = "flow.decision",
            correlation_id = %ctx.correlation_id,
            user_id = %event.user_id,
            replies = decision.replies.len(),
            crm_intents = decision.crm.len(),
            "flow engine decided"
        );

        self.apply_session_change(&event.user_id, &decision).await?;
        self.execute_crm_intents(&decision, ctx).await;
        self.deliver_replies(&event.user_id, &decision, ctx).await;

        Ok(())
    }

    async fn apply_session_change(
        &self,
        user_id: &str,
        decision: &Decision,
    ) -> Result<(), SessionStoreError> {
        match &decision.session {
            SessionChange::Keep => Ok(()),
            SessionChange::Put(session) => self.store.put(user_id, session.clone()).await,
            SessionChange::Clear => self.store.delete(user_id).await,
        }
    }

    async fn execute_crm_intents(&self, decision: &Decision, ctx: &EventContext) {
        for intent in &decision.crm {
            let result = match intent {
                CrmIntent::UpsertContact { user_id, fields } => {
                    self.crm.upsert_contact(user_id, fields).await.map(|_| ())
                }
                CrmIntent::RecordConsent { user_id, granted, legal_basis } => {
                    match self.crm.upsert_contact(user_id, &Default::default()).await {
                        Ok(contact_id) => {
                            self.crm.set_consent(&contact_id, *granted, legal_basis).await
                        }
                        Err(error) => Err(error),
                    }
                }
            };

            if let Err(error) = result {
                error!(
                    event_name = "crm.intent_failed",
                    correlation_id = %ctx.correlation_id,
                    error = %error,
                    "crm intent failed, continuing with remaining intents"
                );
            }
        }
    }

    async fn deliver_replies(&self, user_id: &str, decision: &Decision, ctx: &EventContext) {
        for reply in &decision.replies {
            if let Err(error) = self.sender.deliver(user_id, reply).await {
                error!(
                    event_name = "reply.delivery_failed",
                    correlation_id = %ctx.correlation_id,
                    user_id = %user_id,
                    error = %error,
                    "reply delivery failed, continuing with remaining replies"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::collaborators::{CollaboratorError, NoopCrmConnector};
    use crate::content;
    use crate::engine::UserInput;
    use crate::intents::{ContactFields, ReplyIntent};
    use crate::session::{InMemorySessionStore, QuoteStep, Session};

    const USER: &str = "+4917712345678";

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(String, ReplyIntent)>>,
    }

    #[async_trait]
    impl MessageSender for RecordingSender {
        async fn deliver(
            &self,
            user_id: &str,
            reply: &ReplyIntent,
        ) -> Result<(), CollaboratorError> {
            self.sent.lock().expect("sender lock").push((user_id.to_string(), reply.clone()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingCrm {
        upserts: Mutex<Vec<(String, ContactFields)>>,
        consents: Mutex<Vec<(String, bool, String)>>,
        fail_upserts: bool,
    }

    #[async_trait]
    impl CrmConnector for RecordingCrm {
        async fn upsert_contact(
            &self,
            user_id: &str,
            fields: &ContactFields,
        ) -> Result<String, CollaboratorError> {
            if self.fail_upserts {
                return Err(CollaboratorError::Crm("boom".to_string()));
            }
            self.upserts.lock().expect("crm lock").push((user_id.to_string(), fields.clone()));
            Ok("contact-1".to_string())
        }

        async fn set_consent(
            &self,
            contact_id: &str,
            granted: bool,
            legal_basis: &str,
        ) -> Result<(), CollaboratorError> {
            self.consents.lock().expect("crm lock").push((
                contact_id.to_string(),
                granted,
                legal_basis.to_string(),
            ));
            Ok(())
        }
    }

    fn event(input: UserInput) -> InboundEvent {
        InboundEvent { user_id: USER.to_string(), input, provider_message_id: "wamid.1".to_string() }
    }

    fn ctx() -> EventContext {
        EventContext::new("req-test")
    }

    #[tokio::test]
    async fn full_quote_flow_persists_steps_and_emits_one_upsert() {
        let store = Arc::new(InMemorySessionStore::default());
        let sender = Arc::new(RecordingSender::default());
        let crm = Arc::new(RecordingCrm::default());
        let processor = Processor::new(store.clone(), sender.clone(), crm.clone());

        for raw in ["quote", "Jane", "smart_home", "jane@x.com", "new roof"] {
            processor.process(&event(UserInput::text(raw)), &ctx()).await.expect("process");
        }

        // Flow completed: session gone, one upsert with all collected fields.
        assert_eq!(store.get(USER).await.expect("get"), None);

        let upserts = crm.upserts.lock().expect("crm lock");
        assert_eq!(upserts.len(), 1);
        let (upsert_user, fields) = &upserts[0];
        assert_eq!(upsert_user, USER);
        assert_eq!(fields.first_name.as_deref(), Some("Jane"));
        assert_eq!(fields.email.as_deref(), Some("jane@x.com"));
        assert_eq!(fields.service_interest.as_deref(), Some("smart_home"));
        assert_eq!(fields.project_details.as_deref(), Some("new roof"));

        let sent = sender.sent.lock().expect("sender lock");
        assert_eq!(sent.len(), 5);
        assert_eq!(sent[0].1, content::quote_name_prompt());
        assert_eq!(sent[4].1, content::quote_confirmation("Jane", "jane@x.com"));
    }

    #[tokio::test]
    async fn consent_runs_upsert_then_consent_then_ack() {
        let store = Arc::new(InMemorySessionStore::default());
        let sender = Arc::new(RecordingSender::default());
        let crm = Arc::new(RecordingCrm::default());
        let processor = Processor::new(store, sender.clone(), crm.clone());

        processor.process(&event(UserInput::selection("consent_yes")), &ctx()).await.expect("process");

        assert_eq!(crm.upserts.lock().expect("crm lock").len(), 1);
        let consents = crm.consents.lock().expect("crm lock");
        assert_eq!(
            consents.as_slice(),
            [("contact-1".to_string(), true, content::CONSENT_OPT_IN_BASIS.to_string())]
        );

        let sent = sender.sent.lock().expect("sender lock");
        assert_eq!(sent.as_slice(), [(USER.to_string(), content::consent_ack(true))]);
    }

    #[tokio::test]
    async fn consent_is_skipped_when_the_upsert_fails_but_the_ack_still_sends() {
        let store = Arc::new(InMemorySessionStore::default());
        let sender = Arc::new(RecordingSender::default());
        let crm = Arc::new(RecordingCrm { fail_upserts: true, ..Default::default() });
        let processor = Processor::new(store, sender.clone(), crm.clone());

        processor.process(&event(UserInput::selection("consent_no")), &ctx()).await.expect("process");

        assert!(crm.consents.lock().expect("crm lock").is_empty());
        // Delivery is best-effort and independent of CRM health.
        assert_eq!(sender.sent.lock().expect("sender lock").len(), 1);
    }

    #[tokio::test]
    async fn unmatched_input_touches_no_session_and_no_crm() {
        let store = Arc::new(InMemorySessionStore::default());
        let sender = Arc::new(RecordingSender::default());
        let crm = Arc::new(RecordingCrm::default());
        let processor = Processor::new(store.clone(), sender.clone(), crm.clone());

        processor.process(&event(UserInput::text("lorem ipsum")), &ctx()).await.expect("process");

        assert_eq!(store.get(USER).await.expect("get"), None);
        assert!(crm.upserts.lock().expect("crm lock").is_empty());
        assert_eq!(
            sender.sent.lock().expect("sender lock").as_slice(),
            [(USER.to_string(), content::fallback())]
        );
    }

    #[tokio::test]
    async fn mid_flow_selection_updates_the_stored_session() {
        let store = Arc::new(InMemorySessionStore::default());
        let sender = Arc::new(RecordingSender::default());
        let processor =
            Processor::new(store.clone(), sender, Arc::new(NoopCrmConnector));

        processor.process(&event(UserInput::text("quote")), &ctx()).await.expect("start");
        processor
            .process(&event(UserInput::selection("quote_bau")), &ctx())
            .await
            .expect("shortcut");

        let Some(Session::Quote(session)) = store.get(USER).await.expect("get") else {
            panic!("session must still be active");
        };
        assert_eq!(session.step, QuoteStep::Email);
        assert_eq!(session.service.as_deref(), Some("bau"));
    }
}
