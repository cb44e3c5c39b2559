//! # Transition Controller
//!
//! Fades a region out before a navigation and back in after the swap.
//! The opacity animation itself is a CSS transition on the region; this
//! module only sets the inline styles and runs the completion timer.
//!
//! ```text
//! hide:  transition=d, opacity=0  ──d──▶  visibility=hidden
//! show:  visibility=inherit, flush, transition=d, opacity=1  ──d──▶  clear inline styles
//! ```
//!
//! At most one timer is pending per region. Every call aborts the previous
//! one, so the last call wins and a stale completion never lands.

use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::host::{Region, StyleChange, Visibility};

#[derive(Default)]
pub struct TransitionController {
    pending: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl TransitionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hide(&self, region: &Arc<dyn Region>, duration: Duration) {
        let mut pending = self.lock();
        cancel(&mut pending, region.component());
        debug!("hide {} over {:?}", region.component(), duration);

        if duration.is_zero() {
            region.apply_style(StyleChange::Transition(None));
            region.apply_style(StyleChange::Opacity(Some(0.0)));
            region.apply_style(StyleChange::Visibility(Visibility::Hidden));
            return;
        }

        region.apply_style(StyleChange::Transition(Some(duration)));
        region.apply_style(StyleChange::Opacity(Some(0.0)));

        let target = Arc::clone(region);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            target.apply_style(StyleChange::Visibility(Visibility::Hidden));
        });
        pending.insert(region.component().to_string(), timer);
    }

    pub fn show(&self, region: &Arc<dyn Region>, duration: Duration) {
        let mut pending = self.lock();
        cancel(&mut pending, region.component());
        debug!("show {} over {:?}", region.component(), duration);

        region.apply_style(StyleChange::Visibility(Visibility::Inherit));
        region.flush_layout();

        if duration.is_zero() {
            clear_transition_styles(region.as_ref());
            return;
        }

        region.apply_style(StyleChange::Transition(Some(duration)));
        region.apply_style(StyleChange::Opacity(Some(1.0)));

        let target = Arc::clone(region);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            clear_transition_styles(target.as_ref());
        });
        pending.insert(region.component().to_string(), timer);
    }

    /// True while a completion timer for `component` has not fired yet.
    pub fn is_pending(&self, component: &str) -> bool {
        self.lock()
            .get(component)
            .is_some_and(|timer| !timer.is_finished())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for TransitionController {
    fn drop(&mut self) {
        for (_, timer) in self.lock().drain() {
            timer.abort();
        }
    }
}

fn cancel(pending: &mut HashMap<String, JoinHandle<()>>, component: &str) {
    if let Some(timer) = pending.remove(component) {
        timer.abort();
    }
}

fn clear_transition_styles(region: &dyn Region) {
    region.apply_style(StyleChange::Transition(None));
    region.apply_style(StyleChange::Opacity(None));
}
