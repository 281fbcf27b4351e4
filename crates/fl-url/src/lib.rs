//! Filterlink Request Interpreter and URL Codec
//!
//! This crate turns portal URLs into filter events and filter sets back into
//! shareable portal URLs.
//!
//! - `params`: Positional grouping of `field`/`value`/`filterType` parameters
//! - `interpreter`: Classifies intercepted requests into [`FilterEvent`]s
//! - `scraped`: Classifies filters scraped from the page by the content script
//! - `codec`: Deep-link encoding and decoding
//! - `tracker`: Interpreter and store wired together for the host callbacks
//!
//! [`FilterEvent`]: fl_core::FilterEvent

pub mod codec;
pub mod interpreter;
pub mod params;
pub mod scraped;
pub mod tracker;

pub use codec::{decode, decode_predictable, encode, encode_predictable};
pub use interpreter::{has_reset_marker, interpret_search_url, InterpretError, Interpreter};
pub use tracker::Tracker;
