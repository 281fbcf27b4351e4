//! Persisted Snapshot Format and Sinks
//!
//! This module provides the JSON layout the store persists after every
//! mutation, and the sink abstraction the host storage plugs into.

mod format;
mod sink;

pub use format::*;
pub use sink::*;
