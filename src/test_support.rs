//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::events::{Event, EventBus};
use crate::fetch::{RawResponse, Transport, TransportError};

/// A transport answering from a fixed table. Unknown URLs fail as if the
/// connection was refused.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, (RawResponse, Duration)>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: &str, response: RawResponse) -> Self {
        self.set_route(url, response, Duration::ZERO);
        self
    }

    pub fn delayed_route(self, url: &str, response: RawResponse, delay: Duration) -> Self {
        self.set_route(url, response, delay);
        self
    }

    pub fn set_route(&self, url: &str, response: RawResponse, delay: Duration) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), (response, delay));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn get_fragment(&self, url: &str) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());
        let route = self.routes.lock().unwrap().get(url).cloned();
        match route {
            Some((response, delay)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(response)
            }
            None => Err(TransportError::Network(format!("connection refused: {url}"))),
        }
    }
}

pub fn ok_response(body: &str, title: Option<&str>) -> RawResponse {
    RawResponse {
        status: 200,
        status_text: "OK".to_string(),
        title: title.map(str::to_string),
        body: Some(body.to_string()),
    }
}

pub fn status_response(status: u16, status_text: &str) -> RawResponse {
    RawResponse {
        status,
        status_text: status_text.to_string(),
        title: None,
        body: None,
    }
}

/// Collects every event emitted on `bus`.
pub fn record_events(bus: &EventBus) -> Arc<Mutex<Vec<Event>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    bus.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
    seen
}

pub fn event_names(events: &Mutex<Vec<Event>>) -> Vec<&'static str> {
    events.lock().unwrap().iter().map(Event::name).collect()
}
