use thiserror::Error;

use crate::channel::ChannelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("input is already bound to channel {bound}")]
pub struct BindError {
    pub bound: ChannelId,
}

/// Text taken from the input when the send affordance fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub channel: ChannelId,
    pub text: String,
}

/// Text field plus send affordance.
///
/// Enter and activation triggers exist only while bound to a channel. The
/// binding records which channel they were installed for so submissions can
/// never reach a superseded channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputController {
    text: String,
    enabled: bool,
    focused: bool,
    binding: Option<ChannelId>,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn bound_channel(&self) -> Option<ChannelId> {
        self.binding
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn enable(&mut self) {
        self.enabled = true;
        self.focused = true;
    }

    /// Keeps typed text.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn bind(&mut self, channel: ChannelId) -> Result<(), BindError> {
        if let Some(bound) = self.binding {
            return Err(BindError { bound });
        }

        self.binding = Some(channel);
        Ok(())
    }

    /// Removes the triggers installed by the last [`InputController::bind`].
    pub fn unbind(&mut self) -> Option<ChannelId> {
        self.binding.take()
    }

    /// Enter-key trigger: activates the send affordance.
    pub fn press_enter(&mut self) -> Option<Submission> {
        self.binding?;
        self.activate()
    }

    /// Send activation. Takes the current text, clears the field and disables
    /// itself until re-enabled by a turn result or a fresh channel.
    pub fn activate(&mut self) -> Option<Submission> {
        let channel = self.binding?;
        if !self.enabled {
            return None;
        }

        let text = std::mem::take(&mut self.text);
        self.enabled = false;
        Some(Submission { channel, text })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn activation_takes_text_and_disables() {
        let mut input = InputController::new();
        input.bind(3).expect("bind");
        input.enable();
        input.set_text("ping");

        let submission = input.activate();

        assert_eq!(
            submission,
            Some(Submission {
                channel: 3,
                text: "ping".to_string()
            })
        );
        assert_eq!(input.text(), "");
        assert!(!input.is_enabled());
        assert_eq!(input.activate(), None);
    }

    #[test]
    fn empty_field_submits_empty_string() {
        let mut input = InputController::new();
        input.bind(1).expect("bind");
        input.enable();

        assert_eq!(input.press_enter().map(|submission| submission.text), Some(String::new()));
    }

    #[test]
    fn disabled_or_unbound_activation_keeps_text() {
        let mut input = InputController::new();
        input.set_text("typed while offline");
        input.enable();
        assert_eq!(input.press_enter(), None);
        assert_eq!(input.activate(), None);

        input.bind(2).expect("bind");
        input.disable();
        assert_eq!(input.press_enter(), None);
        assert_eq!(input.text(), "typed while offline");
    }

    #[test]
    fn enable_focuses_and_disable_keeps_focus_state() {
        let mut input = InputController::new();
        assert!(!input.is_focused());

        input.enable();
        assert!(input.is_enabled());
        assert!(input.is_focused());

        input.disable();
        assert!(!input.is_enabled());
    }

    #[test]
    fn rebinding_requires_unbind() {
        let mut input = InputController::new();
        input.bind(4).expect("first bind");

        assert_matches!(input.bind(5), Err(BindError { bound: 4 }));
        assert_eq!(input.unbind(), Some(4));
        assert_eq!(input.unbind(), None);
        input.bind(5).expect("rebind after unbind");
        assert_eq!(input.bound_channel(), Some(5));
    }
}
