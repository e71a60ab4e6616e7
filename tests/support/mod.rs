#![allow(dead_code)]

use session_chat::{ChannelEvent, ChannelHost, ChannelId, ChannelManager, SessionId};

/// Records every host call; hands out sequential channel ids starting at 1.
#[derive(Default)]
pub struct HostSpy {
    pub opened: Vec<(SessionId, ChannelId)>,
    pub sent: Vec<(ChannelId, String)>,
    pub fail_sends: bool,
}

impl HostSpy {
    pub fn open_count(&self) -> usize {
        self.opened.len()
    }

    pub fn last_channel(&self) -> ChannelId {
        self.opened
            .last()
            .map(|(_, channel)| *channel)
            .expect("at least one channel was opened")
    }
}

impl ChannelHost for HostSpy {
    fn open_channel(&mut self, session_id: &SessionId) -> ChannelId {
        let channel = self.opened.len() as ChannelId + 1;
        self.opened.push((session_id.clone(), channel));
        channel
    }

    fn send_frame(&mut self, channel: ChannelId, frame: String) -> Result<(), String> {
        if self.fail_sends {
            return Err(format!("channel {channel} is closing"));
        }
        self.sent.push((channel, frame));
        Ok(())
    }
}

/// Manager with one channel opened and ready.
pub fn ready_manager(session: &str) -> (ChannelManager, HostSpy, ChannelId) {
    let mut manager = ChannelManager::new(SessionId::new(session));
    let mut host = HostSpy::default();
    let channel = manager.open(&mut host).expect("initial open");
    manager.handle_event(ChannelEvent::Opened { channel }, &mut host);
    (manager, host, channel)
}

pub fn deliver(manager: &mut ChannelManager, host: &mut HostSpy, channel: ChannelId, payload: &str) {
    manager.handle_event(
        ChannelEvent::Message {
            channel,
            payload: payload.to_string(),
        },
        host,
    );
}

pub fn text_frame(source: &str, content: &str) -> String {
    serde_json::json!({ "type": "TextMessage", "source": source, "content": content }).to_string()
}

pub const TASK_RESULT_FRAME: &str = r#"{"type":"TaskResult"}"#;
