//! Per-tab filter state and the event reducer
//!
//! The [`FilterStore`] exclusively owns the tab map. Every mutation is
//! followed by a full snapshot write; a failed write is logged and the
//! in-memory state stays authoritative until the next successful one.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::event::{FilterEvent, TabId};
use crate::fields::{entry_for, is_search_field, SEARCH_FIELD};
use crate::snapshot::{decode_snapshot, encode_snapshot, PersistError, SnapshotSink};
use crate::time::Timestamp;
use crate::types::{FilterEntry, FilterKey, FilterSet};
use crate::url::{extract_host, is_bare_listing};

// =============================================================================
// Tab State
// =============================================================================

/// Filters tracked for one browser tab.
#[derive(Debug, Clone, PartialEq)]
pub struct TabFilterState {
    /// Portal host the filters apply to
    pub portal_host: String,
    entries: IndexMap<FilterKey, FilterEntry>,
    pub last_mutation_time: Timestamp,
    pub last_reset_time: Option<Timestamp>,
}

impl TabFilterState {
    pub fn new(portal_host: impl Into<String>, now: Timestamp) -> Self {
        Self {
            portal_host: portal_host.into(),
            entries: IndexMap::new(),
            last_mutation_time: now,
            last_reset_time: None,
        }
    }

    pub(crate) fn from_parts(
        portal_host: String,
        entries: IndexMap<FilterKey, FilterEntry>,
        last_mutation_time: Timestamp,
        last_reset_time: Option<Timestamp>,
    ) -> Self {
        Self {
            portal_host,
            entries,
            last_mutation_time,
            last_reset_time,
        }
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&FilterKey, &FilterEntry)> {
        self.entries.iter()
    }

    pub fn get(&self, key: &FilterKey) -> Option<&FilterEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn filter_set(&self) -> FilterSet {
        FilterSet::from_entries(self.entries.values())
    }

    /// Insert or overwrite in place.
    pub(crate) fn upsert(&mut self, key: FilterKey, entry: FilterEntry) {
        self.entries.insert(key, entry);
    }

    fn remove_key(&mut self, key: &FilterKey) -> bool {
        self.entries.shift_remove(key).is_some()
    }

    fn retain<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&FilterKey, &mut FilterEntry) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(keep);
        before - self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

// =============================================================================
// Navigation
// =============================================================================

/// What the store made of a tab navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// URL is not on a portal
    OffPortal,
    /// Within the post-reset grace window
    SuppressedAfterReset,
    /// Within the post-mutation grace window (redirect noise)
    SuppressedAfterMutation,
    /// Bare listing page and the tab already has no filters
    ConfirmedEmpty,
    /// Nothing to do; the URL may be interpreted
    Unchanged,
}

impl NavigationOutcome {
    /// Whether the navigated URL may be fed back through the interpreter.
    pub fn allows_reprocessing(self) -> bool {
        self == Self::Unchanged
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OffPortal => "off-portal",
            Self::SuppressedAfterReset => "suppressed-after-reset",
            Self::SuppressedAfterMutation => "suppressed-after-mutation",
            Self::ConfirmedEmpty => "confirmed-empty",
            Self::Unchanged => "unchanged",
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Owner of every tab's filter state.
pub struct FilterStore<S> {
    tabs: BTreeMap<TabId, TabFilterState>,
    sink: S,
    config: TrackerConfig,
}

impl<S: SnapshotSink> FilterStore<S> {
    /// Empty store. Nothing is read from the sink.
    pub fn new(config: TrackerConfig, sink: S) -> Self {
        Self {
            tabs: BTreeMap::new(),
            sink,
            config,
        }
    }

    /// Store reloaded from the sink's snapshot. An unreadable snapshot is
    /// logged and the store starts empty.
    pub fn restore(config: TrackerConfig, mut sink: S) -> Self {
        let tabs = match sink.load(&config.storage_key) {
            Ok(Some(json)) => match decode_snapshot(&json) {
                Ok(tabs) => {
                    info!("Restored filter state for {} tab(s)", tabs.len());
                    tabs
                }
                Err(e) => {
                    warn!("Discarding stored filter state: {}", e);
                    BTreeMap::new()
                }
            },
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to load filter state: {}", e);
                BTreeMap::new()
            }
        };

        Self { tabs, sink, config }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn tab(&self, tab_id: TabId) -> Option<&TabFilterState> {
        self.tabs.get(&tab_id)
    }

    pub fn tabs(&self) -> impl Iterator<Item = (TabId, &TabFilterState)> {
        self.tabs.iter().map(|(id, state)| (*id, state))
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Grouped filters for a tab, `None` when the tab is untracked.
    pub fn current_filters(&self, tab_id: TabId) -> Option<FilterSet> {
        self.tabs.get(&tab_id).map(TabFilterState::filter_set)
    }

    /// Apply one event. Returns whether tab state was touched.
    pub fn apply(&mut self, event: FilterEvent, now: Timestamp) -> bool {
        let changed = match event {
            FilterEvent::Reset { tab_id, portal_host } => self.apply_reset(tab_id, portal_host, now),
            FilterEvent::Add {
                tab_id,
                portal_host,
                field,
                value,
            } => self.apply_add(tab_id, portal_host, field, value, now),
            FilterEvent::Remove {
                tab_id, field, value, ..
            } => self.apply_remove(tab_id, &field, &value, now),
        };

        if changed {
            self.persist();
        }
        changed
    }

    fn apply_reset(&mut self, tab_id: TabId, portal_host: String, now: Timestamp) -> bool {
        let state = match self.tabs.entry(tab_id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                if portal_host.is_empty() {
                    debug!("Ignoring reset for untracked tab {}", tab_id);
                    return false;
                }
                entry.insert(TabFilterState::new(portal_host, now))
            }
        };

        debug!("Reset tab {} ({} filter(s) cleared)", tab_id, state.len());
        state.clear();
        state.last_reset_time = Some(now);
        state.last_mutation_time = now;
        true
    }

    fn apply_add(
        &mut self,
        tab_id: TabId,
        portal_host: String,
        field: String,
        value: String,
        now: Timestamp,
    ) -> bool {
        let Some(entry) = entry_for(&field, &value) else {
            debug!("Ignoring add for unrecognized field '{}'", field);
            return false;
        };

        let state = self
            .tabs
            .entry(tab_id)
            .or_insert_with(|| TabFilterState::new(portal_host, now));

        debug!("Tab {}: add {}:{}", tab_id, field, value);
        // Keywords share one key whichever search field carried them
        let key_field = if is_search_field(&field) {
            SEARCH_FIELD.to_string()
        } else {
            field
        };
        state.upsert(FilterKey::new(key_field, value), entry);
        state.last_mutation_time = now;
        true
    }

    fn apply_remove(&mut self, tab_id: TabId, field: &str, value: &str, now: Timestamp) -> bool {
        let Some(state) = self.tabs.get_mut(&tab_id) else {
            debug!("Ignoring remove for untracked tab {}", tab_id);
            return false;
        };

        let removed = match (is_search_field(field), value.is_empty()) {
            // Clearing the search box drops every keyword
            (true, true) => state.retain(|_, entry| !entry.is_search_term()),
            // Keywords are the same filter whichever search field carried them
            (true, false) => {
                state.retain(|_, entry| !(entry.is_search_term() && entry.value() == value))
            }
            (false, true) => state.retain(|key, _| key.field != field),
            (false, false) => usize::from(state.remove_key(&FilterKey::new(field, value))),
        };

        debug!("Tab {}: remove {}:{} ({} entries)", tab_id, field, value, removed);
        state.last_mutation_time = now;
        true
    }

    /// Drop a closed tab's state.
    pub fn on_tab_closed(&mut self, tab_id: TabId) -> bool {
        if self.tabs.remove(&tab_id).is_none() {
            return false;
        }
        debug!("Tab {} closed, state dropped", tab_id);
        self.persist();
        true
    }

    /// Drop state for every tab not in `live_tab_ids`. Returns how many were dropped.
    pub fn prune_stale(&mut self, live_tab_ids: &HashSet<TabId>) -> usize {
        let before = self.tabs.len();
        self.tabs.retain(|tab_id, _| live_tab_ids.contains(tab_id));
        let pruned = before - self.tabs.len();

        if pruned > 0 {
            info!("Pruned filter state for {} closed tab(s)", pruned);
            self.persist();
        }
        pruned
    }

    /// Interpret a tab navigation against the grace windows.
    pub fn on_navigated(&mut self, tab_id: TabId, url: &str, now: Timestamp) -> NavigationOutcome {
        match extract_host(url) {
            Some(host) if self.config.is_portal_host(host) => {}
            _ => return NavigationOutcome::OffPortal,
        }

        let grace = self.config.grace;
        let Some(state) = self.tabs.get_mut(&tab_id) else {
            return NavigationOutcome::Unchanged;
        };

        if let Some(reset_at) = state.last_reset_time {
            if now.since(reset_at) < grace.after_reset {
                return NavigationOutcome::SuppressedAfterReset;
            }
        }
        if now.since(state.last_mutation_time) < grace.after_mutation {
            return NavigationOutcome::SuppressedAfterMutation;
        }

        if is_bare_listing(url) && state.is_empty() {
            state.last_mutation_time = now;
            self.persist();
            return NavigationOutcome::ConfirmedEmpty;
        }

        NavigationOutcome::Unchanged
    }

    /// Current snapshot JSON, as it would be persisted.
    pub fn snapshot_json(&self) -> Result<String, PersistError> {
        encode_snapshot(&self.tabs)
    }

    fn persist(&mut self) {
        let json = match encode_snapshot(&self.tabs) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to encode filter state: {}", e);
                return;
            }
        };

        if let Err(e) = self.sink.store(&self.config.storage_key, &json) {
            warn!("Failed to persist filter state: {}", e);
        }
    }
}
