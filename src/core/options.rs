//! # Navigation Options
//!
//! Callers pass sparse overrides (`NavigateOptions`, every field optional).
//! They are merged onto defaults once per navigation, producing a
//! `ResolvedOptions` that is stored verbatim in the history entry so a later
//! back/forward replay behaves exactly like the forward navigation did.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// jQuery-compatible named animation speeds.
pub const SPEED_FAST_MS: u64 = 200;
pub const SPEED_NORMAL_MS: u64 = 400;
pub const SPEED_SLOW_MS: u64 = 600;

/// An animation duration as written in config: a name or raw milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Speed {
    Named(NamedSpeed),
    Millis(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedSpeed {
    Fast,
    Normal,
    Slow,
}

impl Speed {
    pub fn as_millis(self) -> u64 {
        match self {
            Speed::Named(NamedSpeed::Fast) => SPEED_FAST_MS,
            Speed::Named(NamedSpeed::Normal) => SPEED_NORMAL_MS,
            Speed::Named(NamedSpeed::Slow) => SPEED_SLOW_MS,
            Speed::Millis(ms) => ms,
        }
    }
}

impl Default for Speed {
    fn default() -> Self {
        Speed::Named(NamedSpeed::Fast)
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.as_millis())
    }
}

/// Per-call overrides. `None` means "use the default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigateOptions {
    pub reset_scroll: Option<bool>,
    pub reload_on_error: Option<bool>,
    pub animations: Option<bool>,
    pub fade_in: Option<Speed>,
    pub fade_out: Option<Speed>,
    /// Explicit document title; wins over the `X-DYNOJAX-TITLE` header.
    pub title: Option<String>,
}

impl NavigateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset_scroll(mut self, value: bool) -> Self {
        self.reset_scroll = Some(value);
        self
    }

    pub fn reload_on_error(mut self, value: bool) -> Self {
        self.reload_on_error = Some(value);
        self
    }

    pub fn animations(mut self, value: bool) -> Self {
        self.animations = Some(value);
        self
    }

    pub fn fade_in(mut self, speed: Speed) -> Self {
        self.fade_in = Some(speed);
        self
    }

    pub fn fade_out(mut self, speed: Speed) -> Self {
        self.fade_out = Some(speed);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Merge these overrides onto `defaults`.
    pub fn resolve(&self, defaults: &ResolvedOptions) -> ResolvedOptions {
        ResolvedOptions {
            reset_scroll: self.reset_scroll.unwrap_or(defaults.reset_scroll),
            reload_on_error: self.reload_on_error.unwrap_or(defaults.reload_on_error),
            animations: self.animations.unwrap_or(defaults.animations),
            fade_in_ms: self.fade_in.map_or(defaults.fade_in_ms, Speed::as_millis),
            fade_out_ms: self.fade_out.map_or(defaults.fade_out_ms, Speed::as_millis),
            title: self.title.clone().or_else(|| defaults.title.clone()),
        }
    }
}

/// Fully resolved options for one navigation. Serialized into history state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOptions {
    pub reset_scroll: bool,
    pub reload_on_error: bool,
    pub animations: bool,
    pub fade_in_ms: u64,
    pub fade_out_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        Self {
            reset_scroll: true,
            reload_on_error: true,
            animations: true,
            fade_in_ms: SPEED_FAST_MS,
            fade_out_ms: SPEED_FAST_MS,
            title: None,
        }
    }
}

impl ResolvedOptions {
    /// Defaults for widget loads: same as navigation, but a failed widget
    /// never reloads the page unless asked to.
    pub fn widget_defaults(navigation: &ResolvedOptions) -> ResolvedOptions {
        ResolvedOptions {
            reload_on_error: false,
            ..navigation.clone()
        }
    }

    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }

    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let d = ResolvedOptions::default();
        assert!(d.reset_scroll);
        assert!(d.reload_on_error);
        assert!(d.animations);
        assert_eq!(d.fade_in_ms, 200);
        assert_eq!(d.fade_out_ms, 200);
        assert!(d.title.is_none());
    }

    #[test]
    fn test_empty_overrides_resolve_to_defaults() {
        let resolved = NavigateOptions::new().resolve(&ResolvedOptions::default());
        assert_eq!(resolved, ResolvedOptions::default());
    }

    #[test]
    fn test_overrides_win() {
        let resolved = NavigateOptions::new()
            .animations(false)
            .reset_scroll(false)
            .fade_in(Speed::Named(NamedSpeed::Slow))
            .fade_out(Speed::Millis(0))
            .title("Bar")
            .resolve(&ResolvedOptions::default());
        assert!(!resolved.animations);
        assert!(!resolved.reset_scroll);
        assert!(resolved.reload_on_error);
        assert_eq!(resolved.fade_in_ms, 600);
        assert_eq!(resolved.fade_out_ms, 0);
        assert_eq!(resolved.title.as_deref(), Some("Bar"));
    }

    #[test]
    fn test_widget_defaults_never_reload() {
        let widget = ResolvedOptions::widget_defaults(&ResolvedOptions::default());
        assert!(!widget.reload_on_error);
        assert!(widget.animations);
    }

    #[test]
    fn test_speed_parses_names_and_numbers() {
        #[derive(Deserialize)]
        struct Wrapper {
            a: Speed,
            b: Speed,
            c: Speed,
        }
        let w: Wrapper = toml::from_str("a = \"fast\"\nb = \"normal\"\nc = 350\n").unwrap();
        assert_eq!(w.a.as_millis(), 200);
        assert_eq!(w.b.as_millis(), 400);
        assert_eq!(w.c.as_millis(), 350);
    }

    #[test]
    fn test_resolved_options_serialize_camel_case() {
        let json = serde_json::to_value(ResolvedOptions::default()).unwrap();
        assert_eq!(json["resetScroll"], true);
        assert_eq!(json["fadeInMs"], 200);
        assert!(json.get("title").is_none());
    }
}
