//! The single network entry point for every navigation flow.
//!
//! Success and both kinds of failure collapse into one `FetchResult`.
//! The fetcher emits `response-fail` / `error` itself and owns the
//! reload-on-error fallback; it never touches history or region content.

use log::{debug, info, warn};
use std::sync::Arc;

use crate::core::events::{Event, EventBus};
use crate::core::options::ResolvedOptions;
use crate::fetch::transport::{Transport, TransportError};
use crate::host::Host;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub ok: bool,
    pub data: Option<String>,
    pub title: Option<String>,
    pub status_code: Option<u16>,
    pub error: Option<TransportError>,
    /// A full page navigation was started; the caller must not touch the page.
    pub reloaded: bool,
}

impl FetchResult {
    fn success(status: u16, data: String, title: Option<String>) -> Self {
        Self {
            ok: true,
            data: Some(data),
            title,
            status_code: Some(status),
            error: None,
            reloaded: false,
        }
    }

    fn http_failure(status: u16, reloaded: bool) -> Self {
        Self {
            ok: false,
            data: None,
            title: None,
            status_code: Some(status),
            error: None,
            reloaded,
        }
    }

    /// No response exists, so no status or metadata either.
    fn transport_failure(error: TransportError) -> Self {
        Self {
            ok: false,
            data: None,
            title: None,
            status_code: None,
            error: Some(error),
            reloaded: false,
        }
    }
}

pub struct FragmentFetcher {
    transport: Arc<dyn Transport>,
    host: Arc<dyn Host>,
    events: EventBus,
}

impl FragmentFetcher {
    pub fn new(transport: Arc<dyn Transport>, host: Arc<dyn Host>, events: EventBus) -> Self {
        Self {
            transport,
            host,
            events,
        }
    }

    pub async fn fetch_component(
        &self,
        component: &str,
        url: &str,
        options: &ResolvedOptions,
    ) -> FetchResult {
        self.fetch_guarded(component, url, options, || true).await
    }

    /// Like `fetch_component`, but the reload-on-error fallback only fires
    /// if `still_current()` holds once the response is in.
    pub async fn fetch_guarded<F>(
        &self,
        component: &str,
        url: &str,
        options: &ResolvedOptions,
        still_current: F,
    ) -> FetchResult
    where
        F: Fn() -> bool,
    {
        debug!("fetching {} for {} via {}", url, component, self.transport.name());
        let response = match self.transport.get_fragment(url).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Fragment fetch for {} at {} failed: {}", component, url, e);
                self.events.emit(Event::Error {
                    component: component.to_string(),
                    page: url.to_string(),
                    cause: e.to_string(),
                });
                return FetchResult::transport_failure(e);
            }
        };

        if !response.is_success() {
            self.events.emit(Event::ResponseFail {
                component: component.to_string(),
                page: url.to_string(),
                status_code: response.status,
                status_text: response.status_text.clone(),
            });
            let reload = options.reload_on_error && still_current();
            if reload {
                info!("Reloading {} after HTTP {}", url, response.status);
                self.host.navigate(url);
            } else if options.reload_on_error {
                debug!("Skipping reload of {}: a newer navigation owns {}", url, component);
            }
            return FetchResult::http_failure(response.status, reload);
        }

        let title = options.title.clone().or(response.title);
        FetchResult::success(response.status, response.body.unwrap_or_default(), title)
    }
}
