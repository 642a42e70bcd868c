//! The conversation flow engine: (current session, inbound input) →
//! (next session, reply intents, CRM intents).
//!
//! The engine is pure — given the same triple it always decides the same
//! outputs. All I/O is expressed as intents for collaborators to execute.

use serde::{Deserialize, Serialize};

use crate::content;
use crate::intents::{ContactFields, CrmIntent, ReplyIntent};
use crate::menu::{self, MenuAction};
use crate::session::{QuoteSession, QuoteStep, Session};

/// Selection ids carrying this prefix are mid-flow service re-selections.
const QUOTE_SELECTION_PREFIX: &str = "quote_";

pub const LEAD_STATUS_QUOTE_REQUESTED: &str = "QUOTE_REQUESTED";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    FreeText,
    Selection,
}

/// One normalized user input: free text as typed, or the opaque id of a
/// tapped button/list row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    pub raw: String,
    pub kind: InputKind,
}

impl UserInput {
    pub fn text(raw: impl Into<String>) -> Self {
        Self { raw: raw.into(), kind: InputKind::FreeText }
    }

    pub fn selection(id: impl Into<String>) -> Self {
        Self { raw: id.into(), kind: InputKind::Selection }
    }

    /// Lowercased, trimmed form used for trigger-table matching.
    pub fn normalized(&self) -> String {
        self.raw.trim().to_lowercase()
    }

    /// Case-preserving form stored as a flow answer.
    pub fn answer(&self) -> String {
        self.raw.trim().to_string()
    }
}

/// One inbound message after provider normalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundEvent {
    pub user_id: String,
    pub input: UserInput,
    pub provider_message_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionChange {
    Keep,
    Put(Session),
    Clear,
}

/// What the engine decided for one inbound event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub session: SessionChange,
    pub replies: Vec<ReplyIntent>,
    pub crm: Vec<CrmIntent>,
}

impl Decision {
    fn reply(reply: ReplyIntent) -> Self {
        Self { session: SessionChange::Keep, replies: vec![reply], crm: Vec::new() }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FlowEngine;

impl FlowEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, user_id: &str, input: &UserInput, session: Option<Session>) -> Decision {
        match session {
            Some(Session::Quote(quote)) => self.handle_quote_flow(user_id, input, quote),
            None => self.handle_menu(user_id, input),
        }
    }

    fn handle_quote_flow(
        &self,
        user_id: &str,
        input: &UserInput,
        mut session: QuoteSession,
    ) -> Decision {
        // A `quote_*` selection re-picks the service from any step and jumps
        // straight back to email collection. Known quirk: this also fires
        // from the name step, before a name was collected.
        if input.kind == InputKind::Selection && input.raw.starts_with(QUOTE_SELECTION_PREFIX) {
            session.service = Some(input.raw[QUOTE_SELECTION_PREFIX.len()..].to_string());
            session.step = QuoteStep::Email;
            return Decision {
                session: SessionChange::Put(Session::Quote(session)),
                replies: vec![content::quote_email_prompt()],
                crm: Vec::new(),
            };
        }

        let answer = input.answer();
        match session.step {
            QuoteStep::Name => {
                session.name = Some(answer.clone());
                session.step = QuoteStep::Service;
                Decision {
                    session: SessionChange::Put(Session::Quote(session)),
                    replies: vec![content::quote_service_prompt(&answer)],
                    crm: Vec::new(),
                }
            }
            QuoteStep::Service => {
                session.service = Some(answer);
                session.step = QuoteStep::Email;
                Decision {
                    session: SessionChange::Put(Session::Quote(session)),
                    replies: vec![content::quote_email_prompt()],
                    crm: Vec::new(),
                }
            }
            QuoteStep::Email => {
                // No format validation; any text is accepted as the address.
                session.email = Some(answer);
                session.step = QuoteStep::Details;
                Decision {
                    session: SessionChange::Put(Session::Quote(session)),
                    replies: vec![content::quote_details_prompt()],
                    crm: Vec::new(),
                }
            }
            QuoteStep::Details => {
                session.details = Some(answer);
                let name = session.name.clone().unwrap_or_default();
                let email = session.email.clone().unwrap_or_default();
                Decision {
                    session: SessionChange::Clear,
                    replies: vec![content::quote_confirmation(&name, &email)],
                    crm: vec![CrmIntent::UpsertContact {
                        user_id: user_id.to_string(),
                        fields: ContactFields {
                            first_name: session.name,
                            email: session.email,
                            service_interest: session.service,
                            project_details: session.details,
                            lead_status: Some(LEAD_STATUS_QUOTE_REQUESTED.to_string()),
                        },
                    }],
                }
            }
        }
    }

    fn handle_menu(&self, user_id: &str, input: &UserInput) -> Decision {
        match menu::route(&input.normalized()) {
            MenuAction::MainMenu => Decision::reply(content::main_menu()),
            MenuAction::ServiceDetails(kind) => Decision::reply(content::service_details(kind)),
            MenuAction::StartQuote => Decision {
                session: SessionChange::Put(Session::Quote(QuoteSession::start())),
                replies: vec![content::quote_name_prompt()],
                crm: Vec::new(),
            },
            MenuAction::ContactCard => Decision::reply(content::contact_card()),
            MenuAction::Website => Decision::reply(content::website()),
            MenuAction::ConsentPrompt => Decision::reply(content::consent_prompt()),
            MenuAction::Consent { granted } => Decision {
                session: SessionChange::Keep,
                replies: vec![content::consent_ack(granted)],
                crm: vec![CrmIntent::RecordConsent {
                    user_id: user_id.to_string(),
                    granted,
                    legal_basis: if granted {
                        content::CONSENT_OPT_IN_BASIS.to_string()
                    } else {
                        content::CONSENT_OPT_OUT_BASIS.to_string()
                    },
                }],
            },
            MenuAction::Fallback => Decision::reply(content::fallback()),
        }
    }
}
