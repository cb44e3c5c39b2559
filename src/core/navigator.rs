//! # Navigator
//!
//! Orchestrates one page session: click interception, history push/replace,
//! back/forward replay, and the fetch → swap → reveal sequence.
//!
//! ```text
//! click ──▶ intercept ──▶ load ─┐
//!                                ├─▶ hide ─▶ *-start ─▶ fetch ─▶ swap ─▶ show ─▶ *-end
//! popstate ──▶ replay ──────────┤
//! load_widget ──────────────────┘
//! ```
//!
//! Only `load` writes history. Replay reads it back and never writes.
//!
//! Each region carries a navigation sequence number. When a fetch resolves
//! after a newer navigation on the same region has started, its result is
//! dropped (no swap, no history, no reveal) but its `*-end` still fires.

use futures::{Stream, StreamExt};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::events::{Event, EventBus};
use crate::core::options::{NavigateOptions, ResolvedOptions};
use crate::core::state::{NavigationState, ScrollPosition};
use crate::core::transition::TransitionController;
use crate::fetch::{FetchResult, FragmentFetcher, Transport};
use crate::host::{ClickEvent, Host, HostEvent, PRIMARY_BUTTON, Region};

/// Attribute marking links the navigator should take over.
pub const DEFAULT_MARKER_ATTRIBUTE: &str = "data-dynojax";

/// How an entry point settled. Purely informational: failures are reported
/// through events, never through this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// New content is in the region.
    Swapped,
    /// The fetch failed; old content stays.
    Failed,
    /// A newer navigation on the same region started first; result dropped.
    Superseded,
    /// Left the single-page session with a full page navigation.
    FullPage,
    /// Nothing to do (foreign history entry, unknown region, click not ours).
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Navigate,
    Widget,
    Popstate,
}

impl Flow {
    fn start_event(self, component: &str, page: &str) -> Event {
        let (component, page) = (component.to_string(), page.to_string());
        match self {
            Flow::Navigate => Event::Start { component, page },
            Flow::Widget => Event::WidgetStart { component, page },
            Flow::Popstate => Event::PopstateStart { component, page },
        }
    }

    fn end_event(self, component: &str, page: &str, status_code: Option<u16>) -> Event {
        let (component, page) = (component.to_string(), page.to_string());
        match self {
            Flow::Navigate => Event::End { component, page, status_code },
            Flow::Widget => Event::WidgetEnd { component, page, status_code },
            Flow::Popstate => Event::PopstateEnd { component, page, status_code },
        }
    }
}

/// A resolved fetch together with whether it still owns its region.
struct Settled {
    result: FetchResult,
    current: bool,
}

pub struct NavigatorBuilder {
    host: Arc<dyn Host>,
    transport: Arc<dyn Transport>,
    regions: HashMap<String, Arc<dyn Region>>,
    defaults: ResolvedOptions,
    marker_attribute: String,
    events: EventBus,
}

impl NavigatorBuilder {
    pub fn region(mut self, region: Arc<dyn Region>) -> Self {
        self.regions.insert(region.component().to_string(), region);
        self
    }

    pub fn defaults(mut self, defaults: ResolvedOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn marker_attribute(mut self, name: impl Into<String>) -> Self {
        self.marker_attribute = name.into();
        self
    }

    /// Share an existing bus instead of creating a private one.
    pub fn events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn build(self) -> Navigator {
        let fetcher =
            FragmentFetcher::new(self.transport, Arc::clone(&self.host), self.events.clone());
        Navigator {
            host: self.host,
            fetcher,
            transitions: TransitionController::new(),
            events: self.events,
            regions: self.regions,
            defaults: self.defaults,
            marker_attribute: self.marker_attribute,
            sequences: Mutex::new(HashMap::new()),
        }
    }
}

pub struct Navigator {
    host: Arc<dyn Host>,
    fetcher: FragmentFetcher,
    transitions: TransitionController,
    events: EventBus,
    regions: HashMap<String, Arc<dyn Region>>,
    defaults: ResolvedOptions,
    marker_attribute: String,
    sequences: Mutex<HashMap<String, u64>>,
}

impl Navigator {
    pub fn builder(host: Arc<dyn Host>, transport: Arc<dyn Transport>) -> NavigatorBuilder {
        NavigatorBuilder {
            host,
            transport,
            regions: HashMap::new(),
            defaults: ResolvedOptions::default(),
            marker_attribute: DEFAULT_MARKER_ATTRIBUTE.to_string(),
            events: EventBus::new(),
        }
    }

    /// Capability gate. When false every entry point degrades to full page loads.
    pub fn supported(&self) -> bool {
        self.host.supports_history()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn defaults(&self) -> &ResolvedOptions {
        &self.defaults
    }

    pub fn transitions(&self) -> &TransitionController {
        &self.transitions
    }

    /// Navigate `component` to `page`, recording it in history.
    pub async fn load(&self, component: &str, page: &str, overrides: &NavigateOptions) -> Outcome {
        let options = overrides.resolve(&self.defaults);

        if !self.supported() {
            info!("History unsupported, full page load of {}", page);
            self.host.navigate(page);
            return Outcome::FullPage;
        }

        let Some(region) = self.region(component, page) else {
            return Outcome::Ignored;
        };

        info!("load {} ({}) -> {}", component, region.selector(), page);

        // Remember where the user was, so coming back restores it.
        let leaving = NavigationState::new(component, &options, self.host.scroll_position());
        self.host.replace_state(&leaving, &self.host.title(), None);

        let settled = self.fetch_cycle(Flow::Navigate, &region, page, &options).await;

        let outcome = self.settle(&region, &settled, &options, |data| {
            region.replace_content(data);
            let title = settled.result.title.clone().unwrap_or_else(|| self.host.title());
            let arrived = NavigationState::new(component, &options, ScrollPosition::ORIGIN);
            self.host.push_state(&arrived, &title, page);
            self.host.set_title(&title);
            if options.reset_scroll {
                self.host.scroll_to(ScrollPosition::ORIGIN);
            }
        });

        self.events
            .emit(Flow::Navigate.end_event(component, page, settled.result.status_code));
        outcome
    }

    /// Refresh `component` from `page` without touching history, title or scroll.
    pub async fn load_widget(
        &self,
        component: &str,
        page: &str,
        overrides: &NavigateOptions,
    ) -> Outcome {
        let options = overrides.resolve(&ResolvedOptions::widget_defaults(&self.defaults));

        let Some(region) = self.region(component, page) else {
            return Outcome::Ignored;
        };

        debug!("widget {} -> {}", component, page);

        let settled = self.fetch_cycle(Flow::Widget, &region, page, &options).await;
        let outcome = self.settle(&region, &settled, &options, |data| {
            region.replace_content(data);
        });

        self.events
            .emit(Flow::Widget.end_event(component, page, settled.result.status_code));
        outcome
    }

    /// Replay a history entry the browser just restored.
    pub async fn handle_popstate(&self, state: Option<&serde_json::Value>) -> Outcome {
        let Some(state) = NavigationState::from_history(state) else {
            debug!("popstate for a foreign history entry, ignoring");
            return Outcome::Ignored;
        };

        // The address bar already shows the restored entry.
        let page = self.host.location();
        let Some(region) = self.region(&state.component, &page) else {
            return Outcome::Ignored;
        };

        info!("popstate {} -> {}", state.component, page);

        let settled = self.fetch_cycle(Flow::Popstate, &region, &page, &state.options).await;
        let outcome = self.settle(&region, &settled, &state.options, |data| {
            region.replace_content(data);
            if state.options.reset_scroll {
                self.host.scroll_to(state.scroll);
            }
        });

        self.events
            .emit(Flow::Popstate.end_event(&state.component, &page, settled.result.status_code));
        outcome
    }

    /// Decide whether a click is ours. If so, its default is prevented and the
    /// `(component, href)` to load is returned.
    pub fn intercept(&self, click: &mut ClickEvent) -> Option<(String, String)> {
        // Middle click and modified clicks open a new tab as usual.
        if click.button > PRIMARY_BUTTON || click.modifiers.any() {
            return None;
        }
        if click.default_prevented {
            return None;
        }
        let component = click.target.attribute(&self.marker_attribute)?.to_string();
        let href = click.target.href.clone()?;
        if !self.supported() {
            return None;
        }
        click.prevent_default();
        Some((component, href))
    }

    pub async fn handle_click(&self, click: &mut ClickEvent) -> Outcome {
        match self.intercept(click) {
            Some((component, href)) => {
                self.load(&component, &href, &NavigateOptions::default()).await
            }
            None => Outcome::Ignored,
        }
    }

    /// Listen to host events until the stream ends. Navigations run
    /// concurrently on the calling task, like handlers on an event loop.
    pub async fn run<S>(&self, events: S)
    where
        S: Stream<Item = HostEvent>,
    {
        events
            .for_each_concurrent(None, |event| async move {
                match event {
                    HostEvent::Click(mut click) => {
                        self.handle_click(&mut click).await;
                    }
                    HostEvent::PopState(state) => {
                        self.handle_popstate(state.as_ref()).await;
                    }
                }
            })
            .await;
        debug!("host event stream closed");
    }

    fn region(&self, component: &str, page: &str) -> Option<Arc<dyn Region>> {
        let region = self.regions.get(component).cloned();
        if region.is_none() {
            warn!("No region registered for component {:?}", component);
            self.events.emit(Event::Error {
                component: component.to_string(),
                page: page.to_string(),
                cause: "unknown region".to_string(),
            });
        }
        region
    }

    /// hide → start event → fetch, claiming the region's next sequence number.
    async fn fetch_cycle(
        &self,
        flow: Flow,
        region: &Arc<dyn Region>,
        page: &str,
        options: &ResolvedOptions,
    ) -> Settled {
        let component = region.component();
        let sequence = self.begin(component);

        if options.animations {
            self.transitions.hide(region, options.fade_out());
        }
        self.events.emit(flow.start_event(component, page));

        let result = self
            .fetcher
            .fetch_guarded(component, page, options, || self.is_current(component, sequence))
            .await;
        let current = self.is_current(component, sequence);
        if !current {
            debug!("Dropping stale result #{} for {} ({})", sequence, component, page);
        }
        Settled { result, current }
    }

    /// Apply a settled fetch: `swap` on success, then reveal. A failed fetch
    /// that did not reload reveals the old content again.
    fn settle<F>(
        &self,
        region: &Arc<dyn Region>,
        settled: &Settled,
        options: &ResolvedOptions,
        swap: F,
    ) -> Outcome
    where
        F: FnOnce(&str),
    {
        if !settled.current {
            return Outcome::Superseded;
        }
        if settled.result.reloaded {
            return Outcome::FullPage;
        }

        let outcome = match (settled.result.ok, settled.result.data.as_deref()) {
            (true, Some(data)) => {
                swap(data);
                Outcome::Swapped
            }
            _ => Outcome::Failed,
        };

        if options.animations {
            self.transitions.show(region, options.fade_in());
        }
        outcome
    }

    fn begin(&self, component: &str) -> u64 {
        let mut sequences = self.lock_sequences();
        let next = sequences.entry(component.to_string()).or_insert(0);
        *next += 1;
        *next
    }

    fn is_current(&self, component: &str, sequence: u64) -> bool {
        self.lock_sequences().get(component).copied() == Some(sequence)
    }

    fn lock_sequences(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.sequences.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
