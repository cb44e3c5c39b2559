//! # Navigation Core
//!
//! The state synchronization engine. It knows nothing about a particular
//! browser binding: everything it touches goes through `host::Host`,
//! `host::Region` and `fetch::Transport`.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │        Navigator        │
//!                    │  load / load_widget /   │
//!                    │  popstate / clicks      │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │ Transition │      │  Fragment  │      │  EventBus  │
//!     │ Controller │      │  Fetcher   │      │  (notify)  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`navigator`]: the coordinator and its entry points
//! - [`transition`]: cancellable fade in/out per region
//! - [`events`]: lifecycle notifications
//! - [`options`]: per-call overrides and their resolved form
//! - [`state`]: what gets written into history entries
//! - [`capability`]: the history support gate
//! - [`config`]: `~/.dynojax/config.toml` and the override hierarchy

pub mod capability;
pub mod config;
pub mod events;
pub mod navigator;
pub mod options;
pub mod state;
pub mod transition;
