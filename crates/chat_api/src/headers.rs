use std::collections::BTreeMap;

use crate::config::ChatApiConfig;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// Build a deterministic header map for session-creation requests.
///
/// Extra headers are applied last, lowercased, and may override the defaults.
pub fn build_headers(config: &ChatApiConfig) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert(HEADER_ACCEPT.to_owned(), "application/json".to_owned());

    let user_agent = config
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(default_user_agent);
    headers.insert(HEADER_USER_AGENT.to_owned(), user_agent);

    for (key, value) in &config.extra_headers {
        let key = key.trim().to_ascii_lowercase();
        if key.is_empty() {
            continue;
        }
        headers.insert(key, value.trim().to_owned());
    }

    headers
}

pub fn default_user_agent() -> String {
    format!("session_chat/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_include_accept_and_user_agent() {
        let headers = build_headers(&ChatApiConfig::default());

        assert_eq!(headers.get(HEADER_ACCEPT).map(String::as_str), Some("application/json"));
        assert_eq!(headers.get(HEADER_USER_AGENT), Some(&default_user_agent()));
    }

    #[test]
    fn blank_user_agent_override_falls_back_to_default() {
        let headers = build_headers(&ChatApiConfig::default().with_user_agent("   "));
        assert_eq!(headers.get(HEADER_USER_AGENT), Some(&default_user_agent()));
    }

    #[test]
    fn extra_headers_are_normalized_and_override() {
        let config = ChatApiConfig::default()
            .with_user_agent("kiosk/2")
            .insert_header("X-Trace-Id", " abc ")
            .insert_header("Accept", "application/json; charset=utf-8")
            .insert_header("  ", "ignored");

        let headers = build_headers(&config);

        assert_eq!(headers.get("x-trace-id").map(String::as_str), Some("abc"));
        assert_eq!(
            headers.get(HEADER_ACCEPT).map(String::as_str),
            Some("application/json; charset=utf-8")
        );
        assert_eq!(headers.get(HEADER_USER_AGENT).map(String::as_str), Some("kiosk/2"));
        assert_eq!(headers.len(), 3);
    }
}
