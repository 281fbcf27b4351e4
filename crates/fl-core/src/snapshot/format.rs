//! Snapshot JSON layout
//!
//! ```text
//! {
//!   "<tabId>": {
//!     "portalHost": "acme.bynder.com",
//!     "lastMutationTime": 1700000000000,
//!     "lastResetTime": 1699999990000,        // optional
//!     "entries": [["metaproperty_Color:Red", { "type": "metaproperty", ... }], ...]
//!   }
//! }
//! ```
//!
//! Conversion between the in-memory state and this layout is explicit, so the
//! entry order and the composite keys survive a restart unchanged.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::sink::PersistError;
use crate::event::TabId;
use crate::store::TabFilterState;
use crate::time::Timestamp;
use crate::types::{FilterEntry, FilterKey};

/// Storage key the snapshot lives under.
pub const DEFAULT_STORAGE_KEY: &str = "filterState";

/// Persisted form of one tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    pub portal_host: String,
    #[serde(default)]
    pub last_mutation_time: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reset_time: Option<Timestamp>,
    /// Ordered `[compositeKey, entry]` pairs
    #[serde(default)]
    pub entries: Vec<(String, FilterEntry)>,
}

/// Whole persisted snapshot, keyed by tab id string.
pub type SnapshotRecord = BTreeMap<String, TabRecord>;

impl From<&TabFilterState> for TabRecord {
    fn from(state: &TabFilterState) -> Self {
        Self {
            portal_host: state.portal_host.clone(),
            last_mutation_time: state.last_mutation_time,
            last_reset_time: state.last_reset_time,
            entries: state
                .entries()
                .map(|(key, entry)| (key.to_string(), entry.clone()))
                .collect(),
        }
    }
}

impl From<TabRecord> for TabFilterState {
    fn from(record: TabRecord) -> Self {
        let mut entries = IndexMap::with_capacity(record.entries.len());
        for (raw_key, entry) in record.entries {
            let key = FilterKey::parse(&raw_key).unwrap_or_else(|| entry.default_key());
            entries.insert(key, entry);
        }
        TabFilterState::from_parts(
            record.portal_host,
            entries,
            record.last_mutation_time,
            record.last_reset_time,
        )
    }
}

/// Serialize every tab into the snapshot JSON.
pub fn encode_snapshot(tabs: &BTreeMap<TabId, TabFilterState>) -> Result<String, PersistError> {
    let record: SnapshotRecord = tabs
        .iter()
        .map(|(tab_id, state)| (tab_id.to_string(), TabRecord::from(state)))
        .collect();
    serde_json::to_string(&record).map_err(PersistError::Encode)
}

/// Parse snapshot JSON back into tab states.
pub fn decode_snapshot(json: &str) -> Result<BTreeMap<TabId, TabFilterState>, PersistError> {
    let record: SnapshotRecord = serde_json::from_str(json).map_err(PersistError::Decode)?;

    let mut tabs = BTreeMap::new();
    for (raw_id, tab) in record {
        let tab_id: TabId = raw_id
            .parse()
            .map_err(|_| PersistError::InvalidTabId(raw_id.clone()))?;
        tabs.insert(tab_id, TabFilterState::from(tab));
    }
    Ok(tabs)
}
