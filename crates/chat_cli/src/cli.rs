use std::path::PathBuf;
use std::time::Duration;

use chat_api::config::DEFAULT_RECONNECT_DELAY;
use chat_api::url::DEFAULT_BASE_URL;
use chat_api::ChatApiConfig;
use clap::Parser;
use session_chat::DEFAULT_LOG_CAPACITY;

/// Terminal client for a session-scoped chat server.
///
/// Every flag falls back to its `SESSION_CHAT_*` environment variable.
#[derive(Debug, Clone, Parser)]
#[command(name = "session-chat", version)]
pub struct Cli {
    /// Server address. A `#<session id>` fragment resumes that session;
    /// without one a new session is created.
    #[arg(env = "SESSION_CHAT_ADDRESS", default_value = DEFAULT_BASE_URL)]
    pub address: String,

    /// Timeout in seconds for the session creation request
    #[arg(long, env = "SESSION_CHAT_TIMEOUT_SEC", value_parser = parse_positive_u64)]
    pub timeout_sec: Option<u64>,

    /// Fixed pause before each reconnect, in milliseconds
    #[arg(
        long,
        env = "SESSION_CHAT_RECONNECT_DELAY_MS",
        default_value_t = DEFAULT_RECONNECT_DELAY.as_millis() as u64
    )]
    pub reconnect_delay_ms: u64,

    /// Append every raw frame, followed by a blank line, to this file
    #[arg(long, env = "SESSION_CHAT_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Frames kept in the in-memory event log
    #[arg(
        long,
        env = "SESSION_CHAT_LOG_CAPACITY",
        default_value_t = DEFAULT_LOG_CAPACITY,
        value_parser = parse_positive_usize
    )]
    pub log_capacity: usize,

    /// User-Agent sent with the session creation request
    #[arg(long, env = "SESSION_CHAT_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Extra `NAME:VALUE` header for session creation and channel handshakes.
    /// May be repeated.
    #[arg(long = "header", value_name = "NAME:VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
}

impl Cli {
    pub fn api_config(&self) -> ChatApiConfig {
        let mut config = ChatApiConfig::new(self.address.clone())
            .with_reconnect_delay(Duration::from_millis(self.reconnect_delay_ms));
        if let Some(timeout_sec) = self.timeout_sec {
            config = config.with_timeout(Duration::from_secs(timeout_sec));
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        for (name, value) in &self.headers {
            config = config.insert_header(name.clone(), value.clone());
        }
        config
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let Some((name, value)) = raw.split_once(':') else {
        return Err("expected NAME:VALUE".to_string());
    };
    let name = name.trim();
    if name.is_empty() {
        return Err("header name is empty".to_string());
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn parse_positive_u64(raw: &str) -> Result<u64, String> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err("must be greater than 0".to_string()),
        Ok(value) => Ok(value),
        Err(error) => Err(error.to_string()),
    }
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err("must be greater than 0".to_string()),
        Ok(value) => Ok(value),
        Err(error) => Err(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn explicit_flags_flow_into_api_config() {
        let cli = Cli::try_parse_from([
            "session-chat",
            "https://chat.example.com/#abc",
            "--timeout-sec",
            "5",
            "--reconnect-delay-ms",
            "400",
            "--user-agent",
            "kiosk/2",
            "--header",
            "X-Trace-Id: abc",
            "--header",
            "Authorization:Bearer t0k",
        ])
        .expect("parse");

        let config = cli.api_config();
        assert_eq!(config.base_url, "https://chat.example.com/#abc");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.reconnect_delay, Duration::from_millis(400));
        assert_eq!(config.user_agent.as_deref(), Some("kiosk/2"));
        assert_eq!(
            config.extra_headers.get("X-Trace-Id").map(String::as_str),
            Some("abc")
        );
        assert_eq!(
            config.extra_headers.get("Authorization").map(String::as_str),
            Some("Bearer t0k")
        );
    }

    #[test]
    fn reconnects_are_paced_by_default() {
        let cli = Cli::try_parse_from(["session-chat"]).expect("parse");
        assert_eq!(cli.api_config().reconnect_delay, DEFAULT_RECONNECT_DELAY);
        assert_eq!(cli.reconnect_delay_ms, 250);
    }

    #[test]
    fn header_without_separator_is_rejected() {
        assert!(Cli::try_parse_from(["session-chat", "--header", "X-Trace-Id"]).is_err());
        assert!(Cli::try_parse_from(["session-chat", "--header", ":value"]).is_err());
    }

    #[test]
    fn zero_values_are_rejected() {
        assert!(Cli::try_parse_from(["session-chat", "--timeout-sec", "0"]).is_err());
        assert!(Cli::try_parse_from(["session-chat", "--log-capacity", "0"]).is_err());
    }
}
