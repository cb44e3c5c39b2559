use std::fmt;

use async_trait::async_trait;

/// Request header that asks the server for a fragment instead of a page.
pub const RENDER_HEADER: &str = "X-DYNOJAX-RENDER";
/// Optional response header carrying the new document title.
pub const TITLE_HEADER: &str = "X-DYNOJAX-TITLE";

/// Failures below HTTP: nothing usable came back from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// DNS, connection refused, reset, aborted.
    Network(String),
    Timeout,
    /// The URL resolves outside the page's origin. Never sent.
    CrossOrigin(String),
    InvalidUrl(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(msg) => write!(f, "network error: {msg}"),
            TransportError::Timeout => write!(f, "request timed out"),
            TransportError::CrossOrigin(url) => write!(f, "refusing cross-origin request to {url}"),
            TransportError::InvalidUrl(msg) => write!(f, "invalid url: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// What the server said. `body` is only read for 2xx responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One fragment GET. Implementations must send `RENDER_HEADER: true` and
/// disable caching.
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &str;

    async fn get_fragment(&self, url: &str) -> Result<RawResponse, TransportError>;
}
