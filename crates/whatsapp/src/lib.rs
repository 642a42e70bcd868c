//! WhatsApp Cloud API adapter
//!
//! This crate is the provider boundary for angebot:
//! - **Inbound** (`inbound`) - webhook payload types and normalization of
//!   text, button-reply, list-reply and legacy quick-reply messages
//! - **Outbound** (`outbound`) - rendering of reply intents into Cloud API
//!   message payloads, including transport label truncation
//! - **Client** (`api`) - Graph API calls: send, templates, read receipts
//!
//! The flow engine never sees any of these shapes; it consumes and produces
//! the normalized types from `angebot-core` only.

pub mod api;
pub mod error;
pub mod inbound;
pub mod outbound;
