//! # History State
//!
//! What the navigator writes into each history entry it creates.
//!
//! ```text
//! NavigationState
//! ├── component: String          // region the entry belongs to
//! ├── options: ResolvedOptions   // replayed verbatim on back/forward
//! └── scroll: ScrollPosition     // where the user was on this entry
//! ```
//!
//! The host stores entries as opaque JSON. Entries we did not write (the
//! initial page load, other libraries) are "foreign" and decode to `None`.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::options::ResolvedOptions;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
}

impl ScrollPosition {
    pub const ORIGIN: ScrollPosition = ScrollPosition { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    pub component: String,
    pub options: ResolvedOptions,
    pub scroll: ScrollPosition,
}

impl NavigationState {
    pub fn new(component: &str, options: &ResolvedOptions, scroll: ScrollPosition) -> Self {
        Self {
            component: component.to_string(),
            options: options.clone(),
            scroll,
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Decode a history entry's state. Returns `None` for foreign entries:
    /// no state, no `component`, an empty one, or a shape we don't recognise.
    pub fn from_history(state: Option<&serde_json::Value>) -> Option<NavigationState> {
        let value = state?;
        match value.get("component") {
            Some(serde_json::Value::String(c)) if !c.is_empty() => {}
            _ => return None,
        }
        match serde_json::from_value::<NavigationState>(value.clone()) {
            Ok(state) => Some(state),
            Err(e) => {
                debug!("Ignoring history entry with unreadable state: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_round_trips_through_history_value() {
        let state = NavigationState::new(
            "main",
            &ResolvedOptions::default(),
            ScrollPosition::new(0.0, 120.0),
        );
        let value = state.to_value();
        assert_eq!(value["component"], "main");
        assert_eq!(value["scroll"]["y"], 120.0);
        assert_eq!(NavigationState::from_history(Some(&value)), Some(state));
    }

    #[test]
    fn test_missing_state_is_foreign() {
        assert_eq!(NavigationState::from_history(None), None);
        assert_eq!(NavigationState::from_history(Some(&json!(null))), None);
    }

    #[test]
    fn test_state_without_component_is_foreign() {
        let value = json!({ "scroll": { "x": 0, "y": 0 } });
        assert_eq!(NavigationState::from_history(Some(&value)), None);
        let value = json!({ "component": "", "scroll": { "x": 0, "y": 0 } });
        assert_eq!(NavigationState::from_history(Some(&value)), None);
    }

    #[test]
    fn test_state_from_another_library_is_foreign() {
        // Has a component key but not our shape.
        let value = json!({ "component": "main", "router": 3 });
        assert_eq!(NavigationState::from_history(Some(&value)), None);
    }
}
