//! # Lifecycle Notifications
//!
//! Every observable thing the navigator does is an `Event`. Names and payload
//! fields are the public contract (progress bars and analytics hook into
//! them), so `Event::name()` returns the exact wire names:
//!
//! ```text
//! start / end                   load()
//! widget-start / widget-end     load_widget()
//! popstate-start / popstate-end back/forward replay
//! response-fail                 non-2xx fragment response
//! error                         transport failure
//! ```
//!
//! The `EventBus` is owned by one navigator. Subscribers are callbacks or
//! unbounded streams; emission is synchronous and in subscription order.

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use log::debug;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start {
        component: String,
        page: String,
    },
    End {
        component: String,
        page: String,
        status_code: Option<u16>,
    },
    WidgetStart {
        component: String,
        page: String,
    },
    WidgetEnd {
        component: String,
        page: String,
        status_code: Option<u16>,
    },
    PopstateStart {
        component: String,
        page: String,
    },
    PopstateEnd {
        component: String,
        page: String,
        status_code: Option<u16>,
    },
    ResponseFail {
        component: String,
        page: String,
        status_code: u16,
        status_text: String,
    },
    Error {
        component: String,
        page: String,
        cause: String,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Start { .. } => "start",
            Event::End { .. } => "end",
            Event::WidgetStart { .. } => "widget-start",
            Event::WidgetEnd { .. } => "widget-end",
            Event::PopstateStart { .. } => "popstate-start",
            Event::PopstateEnd { .. } => "popstate-end",
            Event::ResponseFail { .. } => "response-fail",
            Event::Error { .. } => "error",
        }
    }

    pub fn component(&self) -> &str {
        match self {
            Event::Start { component, .. }
            | Event::End { component, .. }
            | Event::WidgetStart { component, .. }
            | Event::WidgetEnd { component, .. }
            | Event::PopstateStart { component, .. }
            | Event::PopstateEnd { component, .. }
            | Event::ResponseFail { component, .. }
            | Event::Error { component, .. } => component,
        }
    }

    pub fn page(&self) -> &str {
        match self {
            Event::Start { page, .. }
            | Event::End { page, .. }
            | Event::WidgetStart { page, .. }
            | Event::WidgetEnd { page, .. }
            | Event::PopstateStart { page, .. }
            | Event::PopstateEnd { page, .. }
            | Event::ResponseFail { page, .. }
            | Event::Error { page, .. } => page,
        }
    }
}

/// Handle returned by `EventBus::subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(&Event) + Send + Sync>;

enum Subscriber {
    Callback(Callback),
    Stream(UnboundedSender<Event>),
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Subscriber)>,
}

/// Instance-scoped notification registry.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<Subscribers>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.insert(Subscriber::Callback(Arc::new(callback)))
    }

    /// Subscribe with a stream. Dropping the receiver unsubscribes on the
    /// next emission.
    pub fn stream(&self) -> UnboundedReceiver<Event> {
        let (tx, rx) = unbounded();
        self.insert(Subscriber::Stream(tx));
        rx
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.lock();
        let before = subs.entries.len();
        subs.entries.retain(|(sid, _)| *sid != id);
        subs.entries.len() != before
    }

    pub fn emit(&self, event: Event) {
        debug!("Event {} component={} page={}", event.name(), event.component(), event.page());

        // Snapshot callbacks so a subscriber may (un)subscribe from inside one.
        let callbacks: Vec<Callback> = {
            let mut subs = self.lock();
            subs.entries.retain(|(_, sub)| match sub {
                Subscriber::Stream(tx) => tx.unbounded_send(event.clone()).is_ok(),
                Subscriber::Callback(_) => true,
            });
            subs.entries
                .iter()
                .filter_map(|(_, sub)| match sub {
                    Subscriber::Callback(cb) => Some(Arc::clone(cb)),
                    Subscriber::Stream(_) => None,
                })
                .collect()
        };

        for callback in callbacks {
            callback(&event);
        }
    }

    fn insert(&self, subscriber: Subscriber) -> SubscriptionId {
        let mut subs = self.lock();
        let id = SubscriptionId(subs.next_id);
        subs.next_id += 1;
        subs.entries.push((id, subscriber));
        id
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Subscribers> {
        // A panicking subscriber must not wedge every later emission.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn start(page: &str) -> Event {
        Event::Start {
            component: "main".into(),
            page: page.into(),
        }
    }

    #[test]
    fn test_event_names_are_wire_names() {
        let names: Vec<&str> = [
            start("/"),
            Event::End {
                component: "c".into(),
                page: "/".into(),
                status_code: Some(200),
            },
            Event::WidgetStart {
                component: "c".into(),
                page: "/".into(),
            },
            Event::WidgetEnd {
                component: "c".into(),
                page: "/".into(),
                status_code: None,
            },
            Event::PopstateStart {
                component: "c".into(),
                page: "/".into(),
            },
            Event::PopstateEnd {
                component: "c".into(),
                page: "/".into(),
                status_code: None,
            },
            Event::ResponseFail {
                component: "c".into(),
                page: "/".into(),
                status_code: 404,
                status_text: "Not Found".into(),
            },
            Event::Error {
                component: "c".into(),
                page: "/".into(),
                cause: "boom".into(),
            },
        ]
        .iter()
        .map(Event::name)
        .collect();
        assert_eq!(
            names,
            vec![
                "start",
                "end",
                "widget-start",
                "widget-end",
                "popstate-start",
                "popstate-end",
                "response-fail",
                "error"
            ]
        );
    }

    #[test]
    fn test_callbacks_receive_in_order() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe(move |e| sink.lock().unwrap().push(e.page().to_string()));

        bus.emit(start("/a"));
        bus.emit(start("/b"));

        assert_eq!(*seen.lock().unwrap(), vec!["/a", "/b"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&seen);
        let id = bus.subscribe(move |_| *sink.lock().unwrap() += 1);

        bus.emit(start("/a"));
        assert!(bus.unsubscribe(id));
        bus.emit(start("/b"));

        assert_eq!(*seen.lock().unwrap(), 1);
        assert!(!bus.unsubscribe(id));
    }

    #[tokio::test]
    async fn test_stream_subscriber() {
        let bus = EventBus::new();
        let mut rx = bus.stream();
        bus.emit(start("/a"));
        assert_eq!(rx.next().await, Some(start("/a")));
    }

    #[test]
    fn test_dropped_stream_is_pruned() {
        let bus = EventBus::new();
        drop(bus.stream());
        bus.emit(start("/a"));
        assert!(bus.lock().entries.is_empty());
    }

    #[test]
    fn test_buses_are_independent() {
        let a = EventBus::new();
        let b = EventBus::new();
        let seen = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&seen);
        b.subscribe(move |_| *sink.lock().unwrap() += 1);
        a.emit(start("/a"));
        assert_eq!(*seen.lock().unwrap(), 0);
    }
}
