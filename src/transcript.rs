use crate::envelope::MessageEnvelope;

/// Text shown before any message has been rendered.
pub const PLACEHOLDER: &str = "Ask a question below...";
/// Appended to the transcript when the channel closes.
pub const DISCONNECT_NOTICE: &str = "\n[Disconnected]\n";

const USER_SOURCE: &str = "user";

/// Display text for the conversation.
///
/// The reset flag starts set so the first rendered message replaces the
/// placeholder. After every disconnect the server replays the session history
/// on the new channel, so the first rendered message after a reset clears the
/// stale text instead of duplicating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRenderer {
    text: String,
    reset_pending: bool,
    scroll_requested: bool,
}

impl Default for TranscriptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptRenderer {
    pub fn new() -> Self {
        Self {
            text: PLACEHOLDER.to_string(),
            reset_pending: true,
            scroll_requested: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// The next rendered line clears the transcript first.
    pub fn reset(&mut self) {
        self.reset_pending = true;
    }

    /// Appends display text for dialogue envelopes. Returns whether anything
    /// was appended; control and unknown envelopes leave the transcript and the
    /// reset flag untouched.
    pub fn render(&mut self, envelope: &MessageEnvelope) -> bool {
        let (source, content) = match envelope {
            MessageEnvelope::TextMessage { source, content } => (source, content),
            MessageEnvelope::HandoffMessage { source, content } if source == USER_SOURCE => {
                (source, content)
            }
            _ => return false,
        };

        if self.reset_pending {
            self.text.clear();
            self.reset_pending = false;
        }

        let from_user = source == USER_SOURCE;
        // Only an empty transcript suppresses the separator before a user turn.
        if from_user && !self.text.is_empty() {
            self.text.push('\n');
        }

        let label = if from_user { "You" } else { "Bot" };
        self.text.push_str(label);
        self.text.push_str(": ");
        self.text.push_str(content);
        self.text.push('\n');
        self.scroll_requested = true;
        true
    }

    /// Appends text outside the rendering rules (disconnect notices).
    pub fn append_notice(&mut self, notice: &str) {
        self.text.push_str(notice);
        self.scroll_requested = true;
    }

    /// Returns and clears the pending scroll-to-end request.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }
}
