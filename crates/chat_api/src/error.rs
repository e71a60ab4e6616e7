use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;
use tokio_tungstenite::tungstenite::Error as WsError;

#[derive(Debug)]
pub enum ChatApiError {
    InvalidBaseUrl(String),
    UnsupportedScheme(String),
    InvalidHeader(String),
    Request(reqwest::Error),
    Status(StatusCode, String),
    Serde(JsonError),
    MissingSessionId,
    WebSocket(WsError),
}

/// Error bodies seen from the session server: FastAPI's `{"detail": ...}` and
/// the `{"error": {"message": ...}}` envelope.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    detail: Option<serde_json::Value>,
    error: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayloadFields {
    message: Option<String>,
}

impl ErrorPayload {
    fn message(&self) -> Option<String> {
        let detail = self.detail.as_ref().and_then(|detail| match detail {
            serde_json::Value::String(text) => non_empty_string(text).map(str::to_owned),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        });

        detail.or_else(|| {
            self.error
                .as_ref()
                .and_then(|error| error.message.as_deref())
                .and_then(non_empty_string)
                .map(str::to_owned)
        })
    }
}

impl fmt::Display for ChatApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl(value) => write!(f, "invalid base URL: {value}"),
            Self::UnsupportedScheme(scheme) => {
                write!(f, "unsupported address scheme '{scheme}' (expected http or https)")
            }
            Self::InvalidHeader(message) => write!(f, "invalid header: {message}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::MissingSessionId => write!(f, "session response has no 'id' field"),
            Self::WebSocket(error) => write!(f, "websocket error: {error}"),
        }
    }
}

impl std::error::Error for ChatApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(error) => Some(error),
            Self::Serde(error) => Some(error),
            Self::WebSocket(error) => Some(error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for ChatApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

impl From<WsError> for ChatApiError {
    fn from(error: WsError) -> Self {
        Self::WebSocket(error)
    }
}

/// Best human-readable message for a failed response body.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(body) {
        if let Some(message) = payload.message() {
            return message;
        }
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

fn non_empty_string(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
