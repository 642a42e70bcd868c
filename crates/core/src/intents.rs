use serde::{Deserialize, Serialize};

/// One labeled choice in a button prompt. The transport imposes a maximum
/// label length; truncation is the formatter's job, not ours.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

impl Choice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    pub description: String,
}

impl ListRow {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self { id: id.into(), title: title.into(), description: description.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSection {
    pub title: String,
    pub rows: Vec<ListRow>,
}

impl ListSection {
    pub fn new(title: impl Into<String>, rows: Vec<ListRow>) -> Self {
        Self { title: title.into(), rows }
    }
}

/// One outbound unit the flow engine wants sent. The engine never talks to
/// the transport directly; a `MessageSender` renders and delivers these.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplyIntent {
    Text { body: String },
    Buttons { body: String, choices: Vec<Choice> },
    List { body: String, button_label: String, sections: Vec<ListSection> },
}

impl ReplyIntent {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text { body: body.into() }
    }

    pub fn buttons(body: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self::Buttons { body: body.into(), choices }
    }

    pub fn list(
        body: impl Into<String>,
        button_label: impl Into<String>,
        sections: Vec<ListSection>,
    ) -> Self {
        Self::List { body: body.into(), button_label: button_label.into(), sections }
    }
}

/// Contact fields collected by the bot, mapped to CRM properties by the
/// connector.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub service_interest: Option<String>,
    pub project_details: Option<String>,
    pub lead_status: Option<String>,
}

/// A side effect on the CRM the engine asks its connector to execute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CrmIntent {
    UpsertContact { user_id: String, fields: ContactFields },
    RecordConsent { user_id: String, granted: bool, legal_basis: String },
}
