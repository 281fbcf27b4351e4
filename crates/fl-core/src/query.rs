//! `GetFilters` query interface
//!
//! Answers the popup's request for the active tab's filters. Missing context
//! (no active tab, untracked tab) never fails: it degrades to the `no-data`
//! shape.

use serde::{Deserialize, Serialize};

use crate::event::TabId;
use crate::snapshot::SnapshotSink;
use crate::store::FilterStore;
use crate::types::FilterSet;
use crate::url::extract_host;

/// Where an answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "kebab-case")]
pub enum FilterSource {
    /// Tracked from intercepted search requests
    StateTracked,
    /// Scraped from the page by the content script
    ContentDirect,
    /// Nothing known about the tab
    NoData,
}

/// Response to `GetFilters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct GetFiltersResponse {
    pub filters: FilterSet,
    pub portal_host: Option<String>,
    pub has_filters: bool,
    pub source: FilterSource,
}

impl GetFiltersResponse {
    pub fn no_data(portal_host: Option<String>) -> Self {
        Self {
            filters: FilterSet::new(),
            portal_host,
            has_filters: false,
            source: FilterSource::NoData,
        }
    }

    fn from_filters(filters: FilterSet, portal_host: Option<String>, source: FilterSource) -> Self {
        Self {
            has_filters: filters.has_filters(),
            filters,
            portal_host,
            source,
        }
    }
}

/// The host's view of the currently active tab.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveTab<'a> {
    pub id: Option<TabId>,
    pub url: Option<&'a str>,
}

impl<S: SnapshotSink> FilterStore<S> {
    /// Answer `GetFilters` for the active tab. `scraped` is the content
    /// script's fallback detection, used only when the tab is untracked.
    pub fn get_filters(&self, active: ActiveTab<'_>, scraped: Option<FilterSet>) -> GetFiltersResponse {
        if let Some(state) = active.id.and_then(|id| self.tab(id)) {
            return GetFiltersResponse::from_filters(
                state.filter_set(),
                Some(state.portal_host.clone()),
                FilterSource::StateTracked,
            );
        }

        let portal_host = active
            .url
            .and_then(extract_host)
            .filter(|host| self.config().is_portal_host(host))
            .map(str::to_string);

        match scraped {
            Some(filters) if filters.has_filters() && portal_host.is_some() => {
                GetFiltersResponse::from_filters(filters, portal_host, FilterSource::ContentDirect)
            }
            _ => GetFiltersResponse::no_data(portal_host),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::event::FilterEvent;
    use crate::snapshot::MemorySink;
    use crate::time::Timestamp;
    use crate::types::FilterEntry;

    fn store() -> FilterStore<MemorySink> {
        FilterStore::new(TrackerConfig::default(), MemorySink::new())
    }

    #[test]
    fn test_state_tracked_answer() {
        let mut store = store();
        store.apply(
            FilterEvent::add(3, "acme.bynder.com", "tags", "hero"),
            Timestamp::from_millis(1),
        );

        let response = store.get_filters(
            ActiveTab { id: Some(3), url: Some("https://acme.bynder.com/media/") },
            None,
        );
        assert_eq!(response.source, FilterSource::StateTracked);
        assert_eq!(response.portal_host.as_deref(), Some("acme.bynder.com"));
        assert!(response.has_filters);
        assert_eq!(response.filters.tags[0].value, "hero");
    }

    #[test]
    fn test_no_data_derives_host_from_active_tab() {
        let store = store();
        let response = store.get_filters(
            ActiveTab { id: Some(8), url: Some("https://acme.bynder.com/media/") },
            None,
        );
        assert_eq!(response, GetFiltersResponse::no_data(Some("acme.bynder.com".into())));

        let off_portal = store.get_filters(
            ActiveTab { id: Some(8), url: Some("https://example.com/") },
            None,
        );
        assert_eq!(off_portal.portal_host, None);
        assert_eq!(store.get_filters(ActiveTab::default(), None).source, FilterSource::NoData);
    }

    #[test]
    fn test_scraped_fallback() {
        let store = store();
        let scraped = FilterSet::from_entries(&[FilterEntry::SearchTerm { value: "logo".into() }]);

        let response = store.get_filters(
            ActiveTab { id: Some(2), url: Some("https://acme.bynder.com/media/") },
            Some(scraped.clone()),
        );
        assert_eq!(response.source, FilterSource::ContentDirect);
        assert_eq!(response.filters, scraped);

        let empty = store.get_filters(
            ActiveTab { id: Some(2), url: Some("https://acme.bynder.com/media/") },
            Some(FilterSet::new()),
        );
        assert_eq!(empty.source, FilterSource::NoData);
    }

    #[test]
    fn test_response_json_shape() {
        let json = serde_json::to_value(GetFiltersResponse::no_data(None)).unwrap();
        assert_eq!(json["source"], "no-data");
        assert_eq!(json["hasFilters"], false);
        assert!(json["portalHost"].is_null());
        assert_eq!(json["filters"]["metaproperties"], serde_json::json!([]));
    }
}
