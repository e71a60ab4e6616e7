use thiserror::Error;

use crate::envelope::{parse_frame, MessageEnvelope, OutboundMessage};
use crate::event_log::{Direction, EventLog, DEFAULT_LOG_CAPACITY};
use crate::input::{InputController, Submission};
use crate::session::SessionId;
use crate::status::{ConnectionPhase, StatusIndicator};
use crate::transcript::{TranscriptRenderer, DISCONNECT_NOTICE};

pub type ChannelId = u64;

/// Transport event, tagged with the channel that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Opened {
        channel: ChannelId,
    },
    Message {
        channel: ChannelId,
        payload: String,
    },
    Closed {
        channel: ChannelId,
        reason: Option<String>,
    },
}

impl ChannelEvent {
    pub fn channel(&self) -> ChannelId {
        match self {
            Self::Opened { channel }
            | Self::Message { channel, .. }
            | Self::Closed { channel, .. } => *channel,
        }
    }
}

/// Transport operations the manager drives.
///
/// `open_channel` only starts the connection; the outcome arrives later as
/// [`ChannelEvent::Opened`] or [`ChannelEvent::Closed`] carrying the returned id.
/// A failed connection attempt must be reported as `Closed`.
pub trait ChannelHost {
    fn open_channel(&mut self, session_id: &SessionId) -> ChannelId;
    fn send_frame(&mut self, channel: ChannelId, frame: String) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Ready,
}

/// Result of a submit trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The frame was handed to the host and logged.
    Sent,
    /// Input is disabled or unbound; nothing was taken from the field.
    NotReady,
    /// The text was taken but the host refused the frame.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveChannel {
    id: ChannelId,
    state: ChannelState,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("channel {channel} for session {session_id} is still live")]
    AlreadyOpen {
        session_id: SessionId,
        channel: ChannelId,
    },
}

/// Owns the single live channel for a session and the surfaces it drives.
///
/// Invariants:
/// - at most one channel is current; events from any other channel are dropped
/// - input triggers are bound only to the current channel, and are unbound
///   before the replacement channel binds its own
/// - every close is followed by exactly one new `open` for the same session
#[derive(Debug)]
pub struct ChannelManager {
    session_id: SessionId,
    active: Option<ActiveChannel>,
    reconnects: u64,
    transcript: TranscriptRenderer,
    input: InputController,
    status: StatusIndicator,
    log: EventLog,
}

impl ChannelManager {
    pub fn new(session_id: SessionId) -> Self {
        Self::with_log_capacity(session_id, DEFAULT_LOG_CAPACITY)
    }

    pub fn with_log_capacity(session_id: SessionId, log_capacity: usize) -> Self {
        Self {
            session_id,
            active: None,
            reconnects: 0,
            transcript: TranscriptRenderer::new(),
            input: InputController::new(),
            status: StatusIndicator::default(),
            log: EventLog::with_capacity(log_capacity),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn active_channel(&self) -> Option<ChannelId> {
        self.active.map(|active| active.id)
    }

    pub fn channel_state(&self) -> Option<ChannelState> {
        self.active.map(|active| active.state)
    }

    /// Number of reopen attempts triggered by closes.
    pub fn reconnect_count(&self) -> u64 {
        self.reconnects
    }

    pub fn transcript(&self) -> &TranscriptRenderer {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut TranscriptRenderer {
        &mut self.transcript
    }

    pub fn input(&self) -> &InputController {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputController {
        &mut self.input
    }

    pub fn status(&self) -> &StatusIndicator {
        &self.status
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Opens a channel for the session. Fails while a channel is still live;
    /// the caller must wait for its close.
    pub fn open(&mut self, host: &mut dyn ChannelHost) -> Result<ChannelId, ChannelError> {
        if let Some(active) = self.active {
            return Err(ChannelError::AlreadyOpen {
                session_id: self.session_id.clone(),
                channel: active.id,
            });
        }

        Ok(self.open_replacement(host))
    }

    pub fn handle_event(&mut self, event: ChannelEvent, host: &mut dyn ChannelHost) {
        let channel = event.channel();
        if self.active_channel() != Some(channel) {
            tracing::debug!(
                channel,
                current = ?self.active_channel(),
                "dropping event from superseded channel"
            );
            return;
        }

        match event {
            ChannelEvent::Opened { channel } => self.on_opened(channel),
            ChannelEvent::Message { payload, .. } => self.on_message(&payload),
            ChannelEvent::Closed { channel, reason } => self.on_closed(channel, reason, host),
        }
    }

    /// Enter-key trigger on the text field.
    pub fn press_enter(&mut self, host: &mut dyn ChannelHost) -> SendOutcome {
        let submission = self.input.press_enter();
        self.dispatch(submission, host)
    }

    /// Activation of the send affordance.
    pub fn activate_send(&mut self, host: &mut dyn ChannelHost) -> SendOutcome {
        let submission = self.input.activate();
        self.dispatch(submission, host)
    }

    fn open_replacement(&mut self, host: &mut dyn ChannelHost) -> ChannelId {
        self.status.set(ConnectionPhase::Connecting);
        let channel = host.open_channel(&self.session_id);
        self.active = Some(ActiveChannel {
            id: channel,
            state: ChannelState::Connecting,
        });
        tracing::info!(session_id = %self.session_id, channel, "opening channel");
        channel
    }

    fn on_opened(&mut self, channel: ChannelId) {
        if let Some(active) = self.active.as_mut() {
            active.state = ChannelState::Ready;
        }

        self.input.enable();
        if let Err(error) = self.input.bind(channel) {
            tracing::warn!(channel, %error, "ignoring duplicate open");
        }
        self.status.set(ConnectionPhase::Ready);
        tracing::info!(session_id = %self.session_id, channel, "channel ready");
    }

    fn on_message(&mut self, payload: &str) {
        let value = match parse_frame(payload) {
            Ok(value) => value,
            Err(error) => {
                self.log.push(Direction::Inbound, payload);
                tracing::warn!(%error, "dropping malformed inbound frame");
                return;
            }
        };
        // Re-serialized compactly; serde_json keeps the sender's key order.
        self.log.push(Direction::Inbound, value.to_string());

        let envelope = match MessageEnvelope::from_value(&value) {
            Ok(envelope) => envelope,
            Err(error) => {
                tracing::warn!(%error, "dropping inbound frame");
                return;
            }
        };

        if let MessageEnvelope::Unknown { kind } = &envelope {
            tracing::debug!(kind = kind.as_deref().unwrap_or(""), "unrendered envelope");
        }

        self.transcript.render(&envelope);
        if envelope.is_task_result() {
            self.input.enable();
        }
    }

    fn on_closed(&mut self, channel: ChannelId, reason: Option<String>, host: &mut dyn ChannelHost) {
        tracing::warn!(
            session_id = %self.session_id,
            channel,
            reason = reason.as_deref().unwrap_or("closed"),
            "channel disconnected"
        );

        self.active = None;
        self.transcript.reset();
        self.transcript.append_notice(DISCONNECT_NOTICE);
        self.input.unbind();
        self.input.disable();
        self.status.set(ConnectionPhase::Disconnected);

        self.reconnects += 1;
        self.open_replacement(host);
    }

    fn dispatch(&mut self, submission: Option<Submission>, host: &mut dyn ChannelHost) -> SendOutcome {
        let Some(Submission { channel, text }) = submission else {
            return SendOutcome::NotReady;
        };

        let frame = OutboundMessage::new(text).to_frame();
        match host.send_frame(channel, frame.clone()) {
            Ok(()) => {
                self.log.push(Direction::Outbound, frame);
                SendOutcome::Sent
            }
            Err(error) => {
                tracing::warn!(channel, %error, "failed to send frame");
                SendOutcome::Failed
            }
        }
    }
}
