//! In-process browser tab: a history stack with a cursor, a location, a
//! title, a scroll offset, and regions that record every mutation.
//!
//! `back()`/`forward()` behave like the browser: they move the cursor,
//! update the location, and hand back the restored entry's state for the
//! caller to deliver as a popstate.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::capability::history_supported;
use crate::core::state::{NavigationState, ScrollPosition};
use crate::host::{Host, Region, StyleChange, Visibility};

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub url: String,
    pub title: String,
    pub state: Option<serde_json::Value>,
}

#[derive(Debug)]
struct Tab {
    supported: bool,
    entries: Vec<HistoryEntry>,
    index: usize,
    title: String,
    scroll: ScrollPosition,
    navigations: Vec<String>,
}

pub struct MemoryHost {
    tab: Mutex<Tab>,
}

impl MemoryHost {
    /// A fresh tab that loaded `url` with a full page request (foreign entry).
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            tab: Mutex::new(Tab {
                supported: true,
                entries: vec![HistoryEntry {
                    url: url.to_string(),
                    title: title.to_string(),
                    state: None,
                }],
                index: 0,
                title: title.to_string(),
                scroll: ScrollPosition::ORIGIN,
                navigations: Vec::new(),
            }),
        }
    }

    /// A tab without history support (old browsers).
    pub fn unsupported(url: &str, title: &str) -> Self {
        let host = Self::new(url, title);
        host.lock().supported = false;
        host
    }

    /// A tab whose history support is decided by its user agent string.
    pub fn with_user_agent(url: &str, title: &str, user_agent: &str) -> Self {
        let host = Self::new(url, title);
        host.lock().supported = history_supported(true, user_agent);
        host
    }

    /// Go back one entry; returns the popstate payload, or `None` at the start.
    pub fn back(&self) -> Option<Option<serde_json::Value>> {
        let mut tab = self.lock();
        if tab.index == 0 {
            return None;
        }
        tab.index -= 1;
        Some(tab.entries[tab.index].state.clone())
    }

    pub fn forward(&self) -> Option<Option<serde_json::Value>> {
        let mut tab = self.lock();
        if tab.index + 1 >= tab.entries.len() {
            return None;
        }
        tab.index += 1;
        Some(tab.entries[tab.index].state.clone())
    }

    /// Simulate the user scrolling the window.
    pub fn scroll_by_user(&self, position: ScrollPosition) {
        self.lock().scroll = position;
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().entries.clone()
    }

    pub fn current_entry(&self) -> HistoryEntry {
        let tab = self.lock();
        tab.entries[tab.index].clone()
    }

    pub fn history_len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Full page navigations requested so far.
    pub fn navigations(&self) -> Vec<String> {
        self.lock().navigations.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Tab> {
        self.tab.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Host for MemoryHost {
    fn supports_history(&self) -> bool {
        self.lock().supported
    }

    fn location(&self) -> String {
        let tab = self.lock();
        tab.entries[tab.index].url.clone()
    }

    fn navigate(&self, url: &str) {
        self.lock().navigations.push(url.to_string());
    }

    fn replace_state(&self, state: &NavigationState, title: &str, url: Option<&str>) {
        let mut tab = self.lock();
        let index = tab.index;
        let entry = &mut tab.entries[index];
        entry.state = Some(state.to_value());
        entry.title = title.to_string();
        if let Some(url) = url {
            entry.url = url.to_string();
        }
    }

    fn push_state(&self, state: &NavigationState, title: &str, url: &str) {
        let mut tab = self.lock();
        // Pushing discards any forward entries.
        let keep = tab.index + 1;
        tab.entries.truncate(keep);
        tab.entries.push(HistoryEntry {
            url: url.to_string(),
            title: title.to_string(),
            state: Some(state.to_value()),
        });
        tab.index = keep;
    }

    fn title(&self) -> String {
        self.lock().title.clone()
    }

    fn set_title(&self, title: &str) {
        self.lock().title = title.to_string();
    }

    fn scroll_position(&self) -> ScrollPosition {
        self.lock().scroll
    }

    fn scroll_to(&self, position: ScrollPosition) {
        self.lock().scroll = position;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegionOp {
    Replace(String),
    Style(StyleChange),
    FlushLayout,
}

#[derive(Debug)]
struct Container {
    content: String,
    opacity: Option<f32>,
    transition: Option<std::time::Duration>,
    visibility: Visibility,
    ops: Vec<RegionOp>,
}

pub struct MemoryRegion {
    component: String,
    container: Mutex<Container>,
}

impl MemoryRegion {
    pub fn new(component: &str, content: &str) -> Arc<Self> {
        Arc::new(Self {
            component: component.to_string(),
            container: Mutex::new(Container {
                content: content.to_string(),
                opacity: None,
                transition: None,
                visibility: Visibility::Inherit,
                ops: Vec::new(),
            }),
        })
    }

    pub fn content(&self) -> String {
        self.lock().content.clone()
    }

    pub fn opacity(&self) -> Option<f32> {
        self.lock().opacity
    }

    pub fn transition(&self) -> Option<std::time::Duration> {
        self.lock().transition
    }

    pub fn visibility(&self) -> Visibility {
        self.lock().visibility
    }

    /// Every mutation applied, in order.
    pub fn ops(&self) -> Vec<RegionOp> {
        self.lock().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.lock().ops.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Container> {
        self.container.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Region for MemoryRegion {
    fn component(&self) -> &str {
        &self.component
    }

    fn replace_content(&self, html: &str) {
        let mut c = self.lock();
        c.content = html.to_string();
        c.ops.push(RegionOp::Replace(html.to_string()));
    }

    fn apply_style(&self, change: StyleChange) {
        let mut c = self.lock();
        match change {
            StyleChange::Transition(d) => c.transition = d,
            StyleChange::Opacity(o) => c.opacity = o,
            StyleChange::Visibility(v) => c.visibility = v,
        }
        c.ops.push(RegionOp::Style(change));
    }

    fn flush_layout(&self) {
        self.lock().ops.push(RegionOp::FlushLayout);
    }
}
