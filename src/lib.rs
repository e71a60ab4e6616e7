//! Session-scoped chat client core.
//!
//! The crate is transport-free: [`ChannelManager`] drives a [`ChannelHost`]
//! and consumes tagged [`ChannelEvent`]s, so the whole connection lifecycle
//! can run against a real WebSocket (see `chat_api`) or a test spy.
//!
//! # Lifecycle
//! - [`SessionResolver`] runs once: the address fragment is reused, otherwise a
//!   session is created and its id written back into the fragment.
//! - [`ChannelManager::open`] reports "Connecting…" and asks the host for a channel.
//! - `Opened` enables input, binds its triggers to that channel and reports "Ready".
//! - `Message` frames are logged, rendered by [`TranscriptRenderer`], and a
//!   `TaskResult` re-enables input.
//! - `Closed` resets the transcript, appends a notice, unbinds and disables input,
//!   reports "Disconnected" and opens a replacement channel immediately.
//!
//! Invariant: events carrying any channel id other than the current one are
//! dropped before they reach a surface.

pub mod channel;
pub mod envelope;
pub mod event_log;
pub mod input;
pub mod session;
pub mod status;
pub mod transcript;

pub use channel::{
    ChannelError, ChannelEvent, ChannelHost, ChannelId, ChannelManager, ChannelState,
    SendOutcome,
};
pub use envelope::{EnvelopeError, MessageEnvelope, OutboundMessage};
pub use event_log::{Direction, EventLog, LogEntry, DEFAULT_LOG_CAPACITY};
pub use input::{BindError, InputController, Submission};
pub use session::{SessionAddress, SessionApi, SessionId, SessionResolver};
pub use status::{ConnectionPhase, StatusIndicator};
pub use transcript::{TranscriptRenderer, DISCONNECT_NOTICE, PLACEHOLDER};
