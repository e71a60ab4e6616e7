use session_chat::SessionId;
use url::Url;

use crate::error::ChatApiError;

/// Default server address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000/";

const SESSIONS_PATH: [&str; 2] = ["api", "sessions"];

/// Parses a user-supplied server address.
///
/// Blank input falls back to [`DEFAULT_BASE_URL`]. Only `http` and `https`
/// are accepted; the fragment is preserved because it carries the session id.
pub fn parse_base_url(input: &str) -> Result<Url, ChatApiError> {
    let trimmed = input.trim();
    let raw = if trimmed.is_empty() {
        DEFAULT_BASE_URL
    } else {
        trimmed
    };

    let url = Url::parse(raw).map_err(|error| ChatApiError::InvalidBaseUrl(format!("{raw}: {error}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ChatApiError::UnsupportedScheme(other.to_string())),
    }
    if url.host_str().is_none() {
        return Err(ChatApiError::InvalidBaseUrl(format!("{raw}: missing host")));
    }

    Ok(url)
}

/// `POST` target for session creation: `<scheme>://<host>/api/sessions`.
///
/// Paths are absolute on the host; any path, query or fragment on the
/// address is dropped.
pub fn sessions_endpoint(base: &Url) -> Result<Url, ChatApiError> {
    api_url(base, None)
}

/// Channel target: `ws://<host>/api/sessions/<id>`, or `wss://` for https.
///
/// The session id is carried as a single path segment.
pub fn channel_endpoint(base: &Url, session_id: &SessionId) -> Result<Url, ChatApiError> {
    let mut url = api_url(base, Some(session_id))?;
    let scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(ChatApiError::UnsupportedScheme(other.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|()| ChatApiError::InvalidBaseUrl(format!("cannot derive {scheme} address from {base}")))?;
    Ok(url)
}

fn api_url(base: &Url, session_id: Option<&SessionId>) -> Result<Url, ChatApiError> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| ChatApiError::InvalidBaseUrl(base.to_string()))?;
        segments.clear();
        segments.extend(SESSIONS_PATH);
        if let Some(session_id) = session_id {
            segments.push(session_id.as_str());
        }
    }
    Ok(url)
}
