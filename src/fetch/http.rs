//! reqwest-backed transport.
//!
//! Page URLs are usually path-relative (`/page2`), so the transport is bound
//! to an origin and resolves every URL against it. Anything that lands on a
//! different scheme/host/port is refused before a request is made.

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Url;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::redirect::Policy;
use std::time::Duration;

use crate::fetch::transport::{
    RENDER_HEADER, RawResponse, TITLE_HEADER, Transport, TransportError,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_REDIRECTS: usize = 10;

pub struct HttpTransport {
    origin: Url,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let origin = Url::parse(base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{base_url}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(same_origin_redirects(&origin))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { origin, client })
    }

    /// Resolve `url` against the origin, rejecting other origins.
    pub fn resolve(&self, url: &str) -> Result<Url, TransportError> {
        let resolved = self
            .origin
            .join(url)
            .map_err(|e| TransportError::InvalidUrl(format!("{url}: {e}")))?;
        if resolved.origin() != self.origin.origin() {
            return Err(TransportError::CrossOrigin(resolved.to_string()));
        }
        Ok(resolved)
    }
}

/// Follow redirects only while they stay on `origin`. A hop elsewhere is not
/// followed; the redirect response itself comes back to the caller.
fn same_origin_redirects(origin: &Url) -> Policy {
    let origin = origin.origin();
    Policy::custom(move |attempt| {
        if attempt.url().origin() != origin {
            warn!("Refusing cross-origin redirect to {}", attempt.url());
            attempt.stop()
        } else if attempt.previous().len() > MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else {
            attempt.follow()
        }
    })
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn get_fragment(&self, url: &str) -> Result<RawResponse, TransportError> {
        let target = self.resolve(url)?;
        info!("GET {} (fragment)", target);

        let response = self
            .client
            .get(target.clone())
            .header(RENDER_HEADER, "true")
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        debug!("{} -> {}", target, status);

        let title = response
            .headers()
            .get(TITLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = if status.is_success() {
            Some(response.text().await.map_err(map_reqwest_error)?)
        } else {
            warn!("Fragment request failed: {} {}", target, status);
            None
        };

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            title,
            body,
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(e.to_string())
    }
}
