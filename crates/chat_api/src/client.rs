use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use session_chat::{SessionApi, SessionId};
use url::Url;

use crate::config::ChatApiConfig;
use crate::error::{parse_error_message, ChatApiError};
use crate::headers::build_headers;
use crate::url::{parse_base_url, sessions_endpoint};

#[derive(Debug)]
pub struct ChatApiClient {
    http: Client,
    config: ChatApiConfig,
    base_url: Url,
}

impl ChatApiClient {
    pub fn new(config: ChatApiConfig) -> Result<Self, ChatApiError> {
        let base_url = parse_base_url(&config.base_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ChatApiError::from)?;
        Ok(Self {
            http,
            config,
            base_url,
        })
    }

    pub fn sessions_endpoint(&self) -> Result<Url, ChatApiError> {
        sessions_endpoint(&self.base_url)
    }

    pub fn build_headers(&self) -> Result<HeaderMap, ChatApiError> {
        let mut out = HeaderMap::new();
        for (key, value) in build_headers(&self.config) {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| ChatApiError::InvalidHeader(format!("invalid header key: {key}")))?,
                HeaderValue::from_str(&value)
                    .map_err(|_| ChatApiError::InvalidHeader(format!("invalid header value for {key}")))?,
            );
        }
        Ok(out)
    }

    pub fn build_create_session_request(&self) -> Result<reqwest::RequestBuilder, ChatApiError> {
        let headers = self.build_headers()?;
        Ok(self.http.post(self.sessions_endpoint()?).headers(headers))
    }

    /// `POST /api/sessions`, returning the new session's id. Single attempt.
    pub async fn create_session(&self) -> Result<SessionId, ChatApiError> {
        let response = self.build_create_session_request()?.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ChatApiError::Status(status, parse_error_message(status, &body)));
        }

        parse_session_body(&body)
    }
}

#[async_trait]
impl SessionApi for ChatApiClient {
    type Error = ChatApiError;

    async fn create_session(&self) -> Result<SessionId, ChatApiError> {
        ChatApiClient::create_session(self).await
    }
}

/// Extracts `id` from a session-creation body. A missing, empty or
/// non-string `id` is [`ChatApiError::MissingSessionId`].
pub fn parse_session_body(body: &str) -> Result<SessionId, ChatApiError> {
    let value: Value = serde_json::from_str(body)?;
    value
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(SessionId::new)
        .ok_or(ChatApiError::MissingSessionId)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn session_body_requires_string_id() {
        assert_eq!(
            parse_session_body(r#"{"id":"V1StGXR8_Z"}"#).expect("id"),
            SessionId::new("V1StGXR8_Z")
        );
        assert_matches!(parse_session_body(r#"{}"#), Err(ChatApiError::MissingSessionId));
        assert_matches!(parse_session_body(r#"{"id":""}"#), Err(ChatApiError::MissingSessionId));
        assert_matches!(parse_session_body(r#"{"id":7}"#), Err(ChatApiError::MissingSessionId));
        assert_matches!(parse_session_body("<html>"), Err(ChatApiError::Serde(_)));
    }

    #[test]
    fn create_request_targets_sessions_endpoint() {
        let client = ChatApiClient::new(ChatApiConfig::new("https://chat.example.com/app/#resume-me"))
            .expect("client");

        let request = client
            .build_create_session_request()
            .expect("build request")
            .build()
            .expect("request");

        assert_eq!(request.method(), "POST");
        assert_eq!(request.url().as_str(), "https://chat.example.com/api/sessions");
        assert_eq!(
            request.headers().get("accept").and_then(|value| value.to_str().ok()),
            Some("application/json")
        );
    }

    #[test]
    fn unsupported_scheme_is_rejected_at_construction() {
        assert_matches!(
            ChatApiClient::new(ChatApiConfig::new("ftp://files.example.com/")),
            Err(ChatApiError::UnsupportedScheme(scheme)) if scheme == "ftp"
        );
    }
}
