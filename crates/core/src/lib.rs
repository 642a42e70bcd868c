pub mod collaborators;
pub mod config;
pub mod content;
pub mod engine;
pub mod intents;
pub mod menu;
pub mod processor;
pub mod session;

pub use collaborators::{
    CollaboratorError, CrmConnector, MessageSender, NoopCrmConnector, NoopMessageSender,
};
pub use engine::{
    Decision, FlowEngine, InboundEvent, InputKind, SessionChange, UserInput,
    LEAD_STATUS_QUOTE_REQUESTED,
};
pub use intents::{Choice, ContactFields, CrmIntent, ListRow, ListSection, ReplyIntent};
pub use menu::{MenuAction, ServiceKind};
pub use processor::{EventContext, Processor};
pub use session::{
    InMemorySessionStore, QuoteSession, QuoteStep, Session, SessionStore, SessionStoreError,
    DEFAULT_SESSION_TTL,
};
