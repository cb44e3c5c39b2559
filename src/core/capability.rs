//! Capability gate: can this browser do single-page navigation at all?
//!
//! `pushState` exists on iOS before 5 but is unreliable there, and the iOS
//! home-screen WebApps shell (CFNetwork) mishandles it too. Both degrade to
//! full page navigation.

use regex::Regex;
use std::sync::LazyLock;

static BROKEN_PUSH_STATE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"((iPod|iPhone|iPad).+\bOS\s+[1-4]\D|WebApps/.+CFNetwork)").ok()
});

pub fn history_supported(has_push_state: bool, user_agent: &str) -> bool {
    if !has_push_state {
        return false;
    }
    match BROKEN_PUSH_STATE.as_ref() {
        Some(re) => !re.is_match(user_agent),
        None => true,
    }
}
