use std::collections::BTreeMap;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use session_chat::{ChannelEvent, ChannelHost, ChannelId, SessionId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use url::Url;

use crate::config::ChatApiConfig;
use crate::error::ChatApiError;
use crate::headers::build_headers;
use crate::url::{channel_endpoint, parse_base_url};

/// Live connection task for one channel id.
///
/// Dropping it aborts the task, so replacing the host's current task can never
/// leave a superseded connection running.
struct ChannelTask {
    id: ChannelId,
    outbound: mpsc::UnboundedSender<String>,
    join_handle: JoinHandle<()>,
}

impl Drop for ChannelTask {
    fn drop(&mut self) {
        self.join_handle.abort();
    }
}

/// [`ChannelHost`] backed by one tokio-tungstenite task per channel.
///
/// Every task reports into the single event queue returned by
/// [`WebSocketHost::new`]; each task ends with exactly one
/// [`ChannelEvent::Closed`], including when the connection attempt fails.
/// Must be used from within a tokio runtime.
pub struct WebSocketHost {
    base_url: Url,
    headers: BTreeMap<String, String>,
    reconnect_delay: Duration,
    events: mpsc::UnboundedSender<ChannelEvent>,
    next_channel_id: ChannelId,
    current: Option<ChannelTask>,
}

impl WebSocketHost {
    pub fn new(
        base_url: Url,
        reconnect_delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<ChannelEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let host = Self {
            base_url,
            headers: BTreeMap::new(),
            reconnect_delay,
            events,
            next_channel_id: 1,
            current: None,
        };
        (host, receiver)
    }

    /// Host whose handshakes carry the same headers as session creation.
    pub fn from_config(
        config: &ChatApiConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ChannelEvent>), ChatApiError> {
        let base_url = parse_base_url(&config.base_url)?;
        let (mut host, events) = Self::new(base_url, config.reconnect_delay);
        host.headers = build_headers(config);
        Ok((host, events))
    }

    pub fn current_channel(&self) -> Option<ChannelId> {
        self.current.as_ref().map(|task| task.id)
    }
}

impl ChannelHost for WebSocketHost {
    fn open_channel(&mut self, session_id: &SessionId) -> ChannelId {
        let channel = self.next_channel_id;
        self.next_channel_id += 1;

        // The first channel connects at once; only reopens wait.
        let delay = if self.current.is_some() {
            self.reconnect_delay
        } else {
            Duration::ZERO
        };
        let endpoint = channel_endpoint(&self.base_url, session_id);
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let join_handle = tokio::spawn(run_channel(
            channel,
            endpoint,
            self.headers.clone(),
            delay,
            outbound_rx,
            self.events.clone(),
        ));

        self.current = Some(ChannelTask {
            id: channel,
            outbound,
            join_handle,
        });
        channel
    }

    fn send_frame(&mut self, channel: ChannelId, frame: String) -> Result<(), String> {
        let Some(task) = self.current.as_ref().filter(|task| task.id == channel) else {
            return Err(format!("channel {channel} is not current"));
        };

        task.outbound
            .send(frame)
            .map_err(|_| format!("channel {channel} is closed"))
    }
}

async fn run_channel(
    channel: ChannelId,
    endpoint: Result<Url, ChatApiError>,
    headers: BTreeMap<String, String>,
    delay: Duration,
    outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<ChannelEvent>,
) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let reason = match endpoint {
        Ok(endpoint) => drive_channel(channel, endpoint, &headers, outbound, &events).await,
        Err(error) => Some(error.to_string()),
    };

    let _ = events.send(ChannelEvent::Closed { channel, reason });
}

/// Returns the close reason, if one is known.
async fn drive_channel(
    channel: ChannelId,
    endpoint: Url,
    headers: &BTreeMap<String, String>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: &mpsc::UnboundedSender<ChannelEvent>,
) -> Option<String> {
    tracing::debug!(channel, %endpoint, "connecting");
    let request = match handshake_request(&endpoint, headers) {
        Ok(request) => request,
        Err(error) => return Some(error.to_string()),
    };
    let (stream, _) = match connect_async(request).await {
        Ok(connected) => connected,
        Err(error) => return Some(ChatApiError::from(error).to_string()),
    };

    if events.send(ChannelEvent::Opened { channel }).is_err() {
        return None;
    }

    let (mut write, mut read) = stream.split();
    loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Some(frame) = frame else {
                    let _ = write.close().await;
                    return None;
                };
                if let Err(error) = write.send(WsMessage::Text(frame.into())).await {
                    return Some(ChatApiError::from(error).to_string());
                }
            }
            message = read.next() => {
                let payload = match message {
                    Some(Ok(WsMessage::Text(text))) => text.as_str().to_owned(),
                    Some(Ok(WsMessage::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => text,
                        Err(_) => {
                            tracing::debug!(channel, "skipping non-UTF-8 binary frame");
                            continue;
                        }
                    },
                    Some(Ok(WsMessage::Close(frame))) => {
                        return Some(match frame {
                            Some(frame) => format!("closed by server ({}) {}", frame.code, frame.reason.as_str()),
                            None => "closed by server".to_string(),
                        });
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(error)) => return Some(ChatApiError::from(error).to_string()),
                    None => return Some("connection ended".to_string()),
                };

                if events.send(ChannelEvent::Message { channel, payload }).is_err() {
                    return None;
                }
            }
        }
    }
}

fn handshake_request(
    endpoint: &Url,
    headers: &BTreeMap<String, String>,
) -> Result<tokio_tungstenite::tungstenite::handshake::client::Request, ChatApiError> {
    let mut request = endpoint.as_str().into_client_request()?;
    for (key, value) in headers {
        request.headers_mut().insert(
            HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| ChatApiError::InvalidHeader(format!("invalid header key: {key}")))?,
            HeaderValue::from_str(value)
                .map_err(|_| ChatApiError::InvalidHeader(format!("invalid header value for {key}")))?,
        );
    }
    Ok(request)
}
