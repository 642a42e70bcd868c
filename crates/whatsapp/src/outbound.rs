//! Rendering of reply intents into Cloud API message payloads.
//!
//! Transport limits live here: reply-button titles are capped at 20
//! characters, list section/row titles at 24. The engine emits labels of
//! any length and never knows about these caps.

use serde::Serialize;

use angebot_core::{Choice, ListSection, ReplyIntent};

pub const BUTTON_TITLE_MAX: usize = 20;
pub const LIST_TITLE_MAX: usize = 24;

#[derive(Clone, Debug, Serialize)]
pub struct OutboundMessage {
    pub messaging_product: &'static str,
    pub recipient_type: &'static str,
    pub to: String,
    #[serde(flatten)]
    pub content: MessageContent,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextBody },
    Interactive { interactive: Interactive },
    Template { template: Template },
}

#[derive(Clone, Debug, Serialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Interactive {
    Button { body: BodyText, action: ButtonAction },
    List { body: BodyText, action: ListAction },
}

#[derive(Clone, Debug, Serialize)]
pub struct BodyText {
    pub text: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ButtonAction {
    pub buttons: Vec<ReplyButton>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReplyButton {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub reply: ReplyRef,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReplyRef {
    pub id: String,
    pub title: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ListAction {
    pub button: String,
    pub sections: Vec<WireSection>,
}

#[derive(Clone, Debug, Serialize)]
pub struct WireSection {
    pub title: String,
    pub rows: Vec<WireRow>,
}

#[derive(Clone, Debug, Serialize)]
pub struct WireRow {
    pub id: String,
    pub title: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Template {
    pub name: String,
    pub language: TemplateLanguage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<serde_json::Value>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TemplateLanguage {
    pub code: String,
}

pub fn render(to: &str, reply: &ReplyIntent) -> OutboundMessage {
    let content = match reply {
        ReplyIntent::Text { body } => MessageContent::Text { text: TextBody { body: body.clone() } },
        ReplyIntent::Buttons { body, choices } => MessageContent::Interactive {
            interactive: Interactive::Button {
                body: BodyText { text: body.clone() },
                action: ButtonAction { buttons: choices.iter().map(reply_button).collect() },
            },
        },
        ReplyIntent::List { body, button_label, sections } => MessageContent::Interactive {
            interactive: Interactive::List {
                body: BodyText { text: body.clone() },
                action: ListAction {
                    button: button_label.clone(),
                    sections: sections.iter().map(wire_section).collect(),
                },
            },
        },
    };

    message(to, content)
}

pub fn render_template(to: &str, name: &str, language_code: &str) -> OutboundMessage {
    message(
        to,
        MessageContent::Template {
            template: Template {
                name: name.to_string(),
                language: TemplateLanguage { code: language_code.to_string() },
                components: Vec::new(),
            },
        },
    )
}

fn message(to: &str, content: MessageContent) -> OutboundMessage {
    OutboundMessage {
        messaging_product: "whatsapp",
        recipient_type: "individual",
        to: to.to_string(),
        content,
    }
}

fn reply_button(choice: &Choice) -> ReplyButton {
    ReplyButton {
        kind: "reply",
        reply: ReplyRef { id: choice.id.clone(), title: truncate(&choice.label, BUTTON_TITLE_MAX) },
    }
}

fn wire_section(section: &ListSection) -> WireSection {
    WireSection {
        title: truncate(&section.title, LIST_TITLE_MAX),
        rows: section
            .rows
            .iter()
            .map(|row| WireRow {
                id: row.id.clone(),
                title: truncate(&row.title, LIST_TITLE_MAX),
                description: row.description.clone(),
            })
            .collect(),
    }
}

// Character-based cap; the platform counts characters, not bytes.
fn truncate(label: &str, max: usize) -> String {
    label.chars().take(max).collect()
}
