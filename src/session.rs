//! Session identity and startup resolution.
//!
//! A session is addressed by an opaque id that lives in the fragment of the
//! server address (`http://host:3000/#<id>`). Starting the client with the same
//! address rejoins the same server-side session.

use std::fmt;

use async_trait::async_trait;
use url::Url;

/// Opaque, server-assigned session identifier. Never validated client-side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The address the client was started with.
///
/// Only the fragment is session state; scheme, host and port select the
/// server for both session creation and the channel endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAddress {
    url: Url,
}

impl SessionAddress {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Url::parse(input.trim()).map(Self::new)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the fragment when present and non-empty.
    pub fn fragment(&self) -> Option<&str> {
        self.url.fragment().filter(|value| !value.is_empty())
    }

    pub fn set_fragment(&mut self, session_id: &SessionId) {
        self.url.set_fragment(Some(session_id.as_str()));
    }

    /// Address that resumes the current session when passed back to the client.
    pub fn resumable(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for SessionAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Server-side session creation (`POST /api/sessions`).
#[async_trait]
pub trait SessionApi {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn create_session(&self) -> Result<SessionId, Self::Error>;
}

/// Obtains the session id once at startup.
pub struct SessionResolver<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A> SessionResolver<'a, A>
where
    A: SessionApi + ?Sized,
{
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Returns the fragment verbatim when one is present. Otherwise creates a
    /// session, writes its id into the address fragment and returns it.
    ///
    /// Creation failures propagate unchanged; there is no retry here.
    pub async fn resolve(&self, address: &mut SessionAddress) -> Result<SessionId, A::Error> {
        if let Some(fragment) = address.fragment() {
            tracing::debug!(session_id = fragment, "resuming session from address fragment");
            return Ok(SessionId::new(fragment));
        }

        let session_id = self.api.create_session().await?;
        address.set_fragment(&session_id);
        tracing::info!(session_id = %session_id, "created session");
        Ok(session_id)
    }
}
