//! Transport for the session chat client.
//!
//! Owns session creation over HTTP (`POST /api/sessions`), endpoint derivation
//! from the user-supplied address, and the WebSocket channel tasks behind
//! [`WebSocketHost`]. No rendering or lifecycle decisions live here; those
//! belong to `session_chat::ChannelManager`.

pub mod channel;
pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod url;

pub use channel::WebSocketHost;
pub use client::ChatApiClient;
pub use config::ChatApiConfig;
pub use error::ChatApiError;
pub use crate::url::{channel_endpoint, parse_base_url, sessions_endpoint};
