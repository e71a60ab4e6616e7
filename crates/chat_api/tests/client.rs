use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use chat_api::{ChatApiClient, ChatApiConfig, ChatApiError};
use reqwest::StatusCode;
use session_chat::{SessionAddress, SessionId, SessionResolver};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// One-shot HTTP server that answers every request with the same response
/// and records each request head it saw.
struct ScriptedServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl ScriptedServer {
    async fn new(status: u16, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("local TCP listener should bind");
        let addr = listener.local_addr().expect("listener address");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let handle = tokio::spawn({
            let requests = Arc::clone(&requests);
            async move {
                while let Ok((socket, _)) = listener.accept().await {
                    serve_one(socket, status, body, &requests).await;
                }
            }
        });

        Self {
            base_url: format!("http://{addr}/"),
            requests,
            handle,
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl Drop for ScriptedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_one(
    mut socket: TcpStream,
    status: u16,
    body: &str,
    requests: &Mutex<Vec<String>>,
) {
    let Ok(head) = read_request_head(&mut socket).await else {
        return;
    };
    requests.lock().expect("requests lock").push(head);

    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown");
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_request_head(socket: &mut TcpStream) -> std::io::Result<String> {
    let mut request = Vec::new();
    let mut buffer = [0_u8; 2048];

    loop {
        let n = socket.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buffer[..n]);
        if request.windows(4).any(|window| window == b"\r\n\r\n") {
            break;
        }
    }

    Ok(String::from_utf8_lossy(&request).into_owned())
}

#[tokio::test]
async fn create_session_posts_to_sessions_endpoint() {
    let server = ScriptedServer::new(200, r#"{"id":"V1StGXR8_Z"}"#).await;
    let client = ChatApiClient::new(ChatApiConfig::new(&server.base_url)).expect("client");

    let session_id = client.create_session().await.expect("session");

    assert_eq!(session_id, SessionId::new("V1StGXR8_Z"));
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(
        requests[0].starts_with("POST /api/sessions HTTP/1.1\r\n"),
        "unexpected request head: {}",
        requests[0]
    );
    assert!(requests[0].to_ascii_lowercase().contains("accept: application/json"));
}

#[tokio::test]
async fn create_session_without_id_is_an_error() {
    let server = ScriptedServer::new(200, r#"{"session":"nope"}"#).await;
    let client = ChatApiClient::new(ChatApiConfig::new(&server.base_url)).expect("client");

    assert_matches!(client.create_session().await, Err(ChatApiError::MissingSessionId));
}

#[tokio::test]
async fn failed_status_surfaces_detail_message() {
    let server = ScriptedServer::new(500, r#"{"detail":"session store unavailable"}"#).await;
    let client = ChatApiClient::new(ChatApiConfig::new(&server.base_url)).expect("client");

    assert_matches!(
        client.create_session().await,
        Err(ChatApiError::Status(status, message))
            if status == StatusCode::INTERNAL_SERVER_ERROR && message == "session store unavailable"
    );
}

#[tokio::test]
async fn resolver_records_created_session_in_address() {
    let server = ScriptedServer::new(200, r#"{"id":"abc123"}"#).await;
    let client = ChatApiClient::new(ChatApiConfig::new(&server.base_url)).expect("client");
    let mut address = SessionAddress::parse(&server.base_url).expect("address");

    let session_id = SessionResolver::new(&client)
        .resolve(&mut address)
        .await
        .expect("resolve");

    assert_eq!(session_id.as_str(), "abc123");
    assert_eq!(address.fragment(), Some("abc123"));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn resolver_reuses_fragment_without_request() {
    let server = ScriptedServer::new(200, r#"{"id":"unused"}"#).await;
    let client = ChatApiClient::new(ChatApiConfig::new(&server.base_url)).expect("client");
    let mut address =
        SessionAddress::parse(&format!("{}#existing-session", server.base_url)).expect("address");

    let session_id = SessionResolver::new(&client)
        .resolve(&mut address)
        .await
        .expect("resolve");

    assert_eq!(session_id.as_str(), "existing-session");
    assert!(server.requests().is_empty());
}
