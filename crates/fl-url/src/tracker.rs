//! Host callback glue
//!
//! [`Tracker`] is what the extension host talks to: it runs intercepted
//! requests through the [`Interpreter`], folds the resulting events into the
//! [`FilterStore`] and feeds navigations through the grace-window check.

use std::collections::HashSet;

use log::{debug, warn};

use fl_core::{FilterStore, NavigationOutcome, SnapshotSink, TabId, Timestamp, TrackerConfig};

use crate::interpreter::{interpret_search_url, Interpreter};

pub struct Tracker<S> {
    interpreter: Interpreter,
    store: FilterStore<S>,
}

impl<S: SnapshotSink> Tracker<S> {
    /// Tracker restored from whatever snapshot the sink holds.
    pub fn new(config: TrackerConfig, sink: S) -> Self {
        Self {
            interpreter: Interpreter::new(&config),
            store: FilterStore::restore(config, sink),
        }
    }

    pub fn store(&self) -> &FilterStore<S> {
        &self.store
    }

    /// Intercepted network request. Returns whether tab state changed.
    pub fn on_request(&mut self, url: &str, tab_id: TabId, now: Timestamp) -> bool {
        match self.interpreter.interpret_request(url, tab_id) {
            Ok(Some(event)) => self.store.apply(event, now),
            Ok(None) => false,
            Err(e) => {
                warn!("Skipping request on tab {}: {}", tab_id, e);
                false
            }
        }
    }

    /// Tab navigation. When the store lets the URL through, every filter
    /// group in it is applied, so a search URL opened directly is tracked too.
    pub fn on_navigated(&mut self, tab_id: TabId, url: &str, now: Timestamp) -> NavigationOutcome {
        let outcome = self.store.on_navigated(tab_id, url, now);
        if !outcome.allows_reprocessing() {
            debug!("Navigation on tab {}: {}", tab_id, outcome.as_str());
            return outcome;
        }

        match interpret_search_url(url, tab_id) {
            Ok(events) => {
                for event in events {
                    self.store.apply(event, now);
                }
            }
            Err(e) => warn!("Skipping navigation on tab {}: {}", tab_id, e),
        }
        outcome
    }

    pub fn on_tab_closed(&mut self, tab_id: TabId) -> bool {
        self.store.on_tab_closed(tab_id)
    }

    pub fn prune_stale(&mut self, live_tab_ids: &HashSet<TabId>) -> usize {
        self.store.prune_stale(live_tab_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_core::MemorySink;

    const SEARCH: &str = "https://acme.bynder.com/api/v4/search/assets/";

    fn tracker() -> Tracker<MemorySink> {
        Tracker::new(TrackerConfig::default(), MemorySink::new())
    }

    fn at(secs: u64) -> Timestamp {
        Timestamp::from_millis(secs * 1000)
    }

    fn keys(tracker: &Tracker<MemorySink>, tab_id: TabId) -> Vec<String> {
        tracker
            .store()
            .tab(tab_id)
            .map(|state| state.entries().map(|(k, _)| k.to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_request_sequence() {
        let mut tracker = tracker();
        assert!(tracker.on_request(
            &format!("{}?field=metaproperty_Color&value=Red&filterType=add", SEARCH),
            1,
            at(0)
        ));
        assert!(tracker.on_request(&format!("{}?field=tags&value=hero", SEARCH), 1, at(1)));
        assert!(tracker.on_request(
            &format!("{}?field=tags&value=hero&filterType=remove", SEARCH),
            1,
            at(2)
        ));
        assert_eq!(keys(&tracker, 1), vec!["metaproperty_Color:Red"]);

        assert!(tracker.on_request(&format!("{}?resetsearch", SEARCH), 1, at(3)));
        assert!(keys(&tracker, 1).is_empty());
        assert_eq!(tracker.store().sink().writes(), 4);
    }

    #[test]
    fn test_unrelated_and_broken_requests() {
        let mut tracker = tracker();
        assert!(!tracker.on_request("https://acme.bynder.com/api/v4/users/", 1, at(0)));
        assert!(!tracker.on_request("https://[x/search/assets/?field=tags&value=a", 1, at(0)));
        assert!(tracker.store().is_empty());
    }

    #[test]
    fn test_redirect_noise_is_suppressed() {
        let mut tracker = tracker();
        tracker.on_request(&format!("{}?field=tags&value=hero", SEARCH), 1, at(10));

        let outcome = tracker.on_navigated(1, "https://acme.bynder.com/media/", at(12));
        assert_eq!(outcome, NavigationOutcome::SuppressedAfterMutation);
        assert_eq!(keys(&tracker, 1), vec!["tags:hero"]);

        // Past the window the bare listing still does not clear tracked filters
        let outcome = tracker.on_navigated(1, "https://acme.bynder.com/media/", at(20));
        assert_eq!(outcome, NavigationOutcome::Unchanged);
        assert_eq!(keys(&tracker, 1), vec!["tags:hero"]);
    }

    #[test]
    fn test_navigation_to_search_url_is_tracked() {
        let mut tracker = tracker();
        let outcome = tracker.on_navigated(
            4,
            "https://acme.bynder.com/search/set/?resetsearch&field=metaproperty_Color&value=Red\
             &filterType=add&field=tags&value=hero&filterType=add",
            at(0),
        );
        assert_eq!(outcome, NavigationOutcome::Unchanged);
        assert_eq!(keys(&tracker, 4), vec!["metaproperty_Color:Red", "tags:hero"]);

        // Inside the reset window nothing is reprocessed
        let outcome = tracker.on_navigated(
            4,
            "https://acme.bynder.com/search/media/?resetsearch&field=tags&value=other",
            at(1),
        );
        assert_eq!(outcome, NavigationOutcome::SuppressedAfterReset);
        assert_eq!(keys(&tracker, 4).len(), 2);
    }

    #[test]
    fn test_off_portal_navigation() {
        let mut tracker = tracker();
        let outcome = tracker.on_navigated(2, "https://example.com/?field=tags&value=x", at(0));
        assert_eq!(outcome, NavigationOutcome::OffPortal);
        assert!(tracker.store().tab(2).is_none());
    }

    #[test]
    fn test_restart_restores_state() {
        let mut tracker = tracker();
        tracker.on_request(&format!("{}?field=text&value=logo", SEARCH), 9, at(0));
        let snapshot = tracker.store().snapshot_json().unwrap();

        let restored = Tracker::new(
            TrackerConfig::default(),
            MemorySink::with_record(&TrackerConfig::default().storage_key, &snapshot),
        );
        assert_eq!(keys(&restored, 9), vec!["text:logo"]);
    }

    #[test]
    fn test_close_and_prune() {
        let mut tracker = tracker();
        for tab in [1, 2, 3] {
            tracker.on_request(&format!("{}?field=tags&value=t{}", SEARCH, tab), tab, at(0));
        }
        assert!(tracker.on_tab_closed(1));
        assert!(!tracker.on_tab_closed(1));

        let live: HashSet<TabId> = [3].into_iter().collect();
        assert_eq!(tracker.prune_stale(&live), 1);
        assert_eq!(tracker.store().len(), 1);
    }
}
