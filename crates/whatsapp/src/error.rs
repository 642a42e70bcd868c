use thiserror::Error;

#[derive(Debug, Error)]
pub enum WhatsAppError {
    #[error("Cloud API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, WhatsAppError>;
