//! # Host Environment
//!
//! The browser surface the navigator drives, as two traits:
//!
//! - [`Host`]: history stack, location, document title, window scroll and
//!   the capability gate. One per page session.
//! - [`Region`]: one DOM container, addressed as `dynojax-<component>`.
//!
//! A wasm embedding implements these over `web-sys`. [`memory`] is a
//! complete in-process implementation used by the CLI and the tests.
//!
//! Host callbacks arrive as [`HostEvent`]s on a stream the navigator owns
//! (see `Navigator::run`).

pub mod memory;

use std::collections::BTreeMap;
use std::time::Duration;

use crate::core::state::{NavigationState, ScrollPosition};

/// Container class/id prefix. A region for component `main` lives at `dynojax-main`.
pub const REGION_PREFIX: &str = "dynojax-";

pub fn region_selector(component: &str) -> String {
    format!("{REGION_PREFIX}{component}")
}

pub trait Host: Send + Sync {
    /// Whether `pushState`/`replaceState` are usable here.
    fn supports_history(&self) -> bool;

    /// Current document location (absolute or path-relative, as the host reports it).
    fn location(&self) -> String;

    /// Full page navigation. Leaves the single-page session.
    fn navigate(&self, url: &str);

    fn replace_state(&self, state: &NavigationState, title: &str, url: Option<&str>);

    fn push_state(&self, state: &NavigationState, title: &str, url: &str);

    fn title(&self) -> String;

    fn set_title(&self, title: &str);

    fn scroll_position(&self) -> ScrollPosition;

    fn scroll_to(&self, position: ScrollPosition);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Stylesheet-driven (inline style removed).
    Inherit,
    Hidden,
}

/// Inline style mutations the transition controller performs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleChange {
    /// `transition: opacity <d> ...`; `None` removes it.
    Transition(Option<Duration>),
    /// Inline opacity; `None` removes it.
    Opacity(Option<f32>),
    Visibility(Visibility),
}

pub trait Region: Send + Sync {
    fn component(&self) -> &str;

    /// The container's address in the document.
    fn selector(&self) -> String {
        region_selector(self.component())
    }

    /// Replace the container's content wholesale (innerHTML).
    fn replace_content(&self, html: &str);

    fn apply_style(&self, change: StyleChange);

    /// Force a synchronous layout so a following transition is observable.
    fn flush_layout(&self);
}

/// Mouse buttons by DOM `which` numbering.
pub const PRIMARY_BUTTON: u16 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.ctrl || self.meta || self.shift || self.alt
    }
}

/// The clicked element, reduced to what interception needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchor {
    pub href: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

impl Anchor {
    pub fn new(href: &str) -> Self {
        Self {
            href: Some(href.to_string()),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub button: u16,
    pub modifiers: Modifiers,
    pub default_prevented: bool,
    pub target: Anchor,
}

impl ClickEvent {
    /// A plain primary-button click on `target`.
    pub fn primary(target: Anchor) -> Self {
        Self {
            button: PRIMARY_BUTTON,
            modifiers: Modifiers::default(),
            default_prevented: false,
            target,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Click(ClickEvent),
    /// The browser restored a history entry; carries that entry's state.
    PopState(Option<serde_json::Value>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_selector() {
        assert_eq!(region_selector("main"), "dynojax-main");
        let region = memory::MemoryRegion::new("sidebar", "");
        assert_eq!(region.selector(), "dynojax-sidebar");
    }

    #[test]
    fn test_modifiers_any() {
        assert!(!Modifiers::default().any());
        assert!(Modifiers { alt: true, ..Default::default() }.any());
    }

    #[test]
    fn test_anchor_attributes() {
        let a = Anchor::new("/p2").with_attribute("data-dynojax", "main");
        assert_eq!(a.attribute("data-dynojax"), Some("main"));
        assert_eq!(a.attribute("data-other"), None);
        assert_eq!(a.href.as_deref(), Some("/p2"));
    }
}
