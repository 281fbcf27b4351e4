//! Filterlink Core Library
//!
//! This crate provides the filter state engine for the Filterlink browser extension.
//! It tracks the search filters a user applies on a Bynder portal, one state per
//! browser tab, and keeps that state durable across service worker restarts.
//!
//! # Architecture
//!
//! Intercepted search requests are turned into [`FilterEvent`]s (see the `fl-url`
//! crate). The [`FilterStore`] folds those events into a [`TabFilterState`] per tab
//! and writes the full collection through a [`SnapshotSink`] after every mutation.
//! Readers get a grouped [`FilterSet`] back, ready for the URL codec and the popup.
//!
//! # Modules
//!
//! - `config`: Tracker configuration and grace-window policy
//! - `event`: Filter events produced by the interpreter
//! - `fields`: Allow-list of portal filter fields
//! - `query`: The popup's `GetFilters` request/response
//! - `snapshot`: Persisted snapshot layout and storage sinks
//! - `store`: Per-tab filter state and the event reducer
//! - `time`: Millisecond timestamps
//! - `types`: Filter entries and grouped filter sets
//! - `url`: Allocation-free URL slicing helpers

pub mod config;
pub mod event;
pub mod fields;
pub mod query;
pub mod snapshot;
pub mod store;
pub mod time;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use config::{GracePolicy, TrackerConfig};
pub use event::{FilterEvent, TabId};
pub use query::{ActiveTab, FilterSource, GetFiltersResponse};
pub use snapshot::{MemorySink, PersistError, SnapshotSink};
pub use store::{FilterStore, NavigationOutcome, TabFilterState};
pub use time::Timestamp;
pub use types::{FilterEntry, FilterKey, FilterSet, TagKind};
