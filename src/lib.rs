//! Dynojax: swap one page region with server-rendered fragments while
//! keeping browser history, scroll and titles in sync.

pub mod core;
pub mod fetch;
pub mod host;

#[cfg(test)]
pub mod test_support;

pub use crate::core::events::{Event, EventBus, SubscriptionId};
pub use crate::core::navigator::{Navigator, NavigatorBuilder, Outcome};
pub use crate::core::options::{NavigateOptions, ResolvedOptions, Speed};
pub use crate::core::state::{NavigationState, ScrollPosition};
pub use crate::fetch::{FetchResult, FragmentFetcher, HttpTransport, Transport, TransportError};
pub use crate::host::{Host, HostEvent, Region};
