//! Request interpreter
//!
//! Turns intercepted portal URLs into [`FilterEvent`]s. Single search requests
//! produce at most one event; a navigated search URL can produce several.

use log::debug;
use url::Url;

use fl_core::fields::{classify_field, is_range_dropped, RANGE_SEPARATOR};
use fl_core::url::{contains_ignore_case, extract_path, extract_query, has_query_key, raw_query_pairs};
use fl_core::{FilterEvent, TabId, TrackerConfig};

use crate::params::{group_filter_params, query_params, FilterAction, ParamGroup};

/// Error type for URL interpretation.
#[derive(Debug, thiserror::Error)]
pub enum InterpretError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

pub(crate) fn parse_url(url: &str) -> Result<Url, InterpretError> {
    Url::parse(url).map_err(|source| InterpretError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

/// Whether a query string asks the portal to drop every filter.
///
/// Accepted spellings: `resetsearch` in any casing, `clearfilters` in any
/// casing, and `reset=true`.
pub fn has_reset_marker(query: &str) -> bool {
    contains_ignore_case(query, "resetsearch")
        || contains_ignore_case(query, "clearfilters")
        || raw_query_pairs(query).any(|(key, value)| key == "reset" && value == "true")
}

/// Classifier for the network request feed.
#[derive(Debug, Clone)]
pub struct Interpreter {
    search_path: String,
}

impl Interpreter {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            search_path: config.search_path.clone(),
        }
    }

    /// Cheap pre-check: a search request carrying a reset marker or a `field`.
    pub fn is_filter_request(&self, url: &str) -> bool {
        if !extract_path(url).contains(self.search_path.as_str()) {
            return false;
        }
        match extract_query(url) {
            Some(query) => has_reset_marker(query) || has_query_key(query, "field"),
            None => false,
        }
    }

    /// Classify one intercepted request. A reset marker wins over any filter
    /// parameters; otherwise the first `field` group decides.
    pub fn interpret_request(
        &self,
        url: &str,
        tab_id: TabId,
    ) -> Result<Option<FilterEvent>, InterpretError> {
        if !self.is_filter_request(url) {
            return Ok(None);
        }

        let parsed = parse_url(url)?;
        let portal_host = parsed.host_str().unwrap_or_default();

        if parsed.query().is_some_and(has_reset_marker) {
            return Ok(Some(FilterEvent::reset(tab_id, portal_host)));
        }

        let params = query_params(&parsed);
        let event = group_filter_params(&params)
            .into_iter()
            .next()
            .and_then(|group| event_from_group(group, tab_id, portal_host));
        Ok(event)
    }
}

/// Classify every filter group of a full search URL. A reset marker yields a
/// leading [`FilterEvent::Reset`].
pub fn interpret_search_url(url: &str, tab_id: TabId) -> Result<Vec<FilterEvent>, InterpretError> {
    let parsed = parse_url(url)?;
    let portal_host = parsed.host_str().unwrap_or_default();

    let mut events = Vec::new();
    if parsed.query().is_some_and(has_reset_marker) {
        events.push(FilterEvent::reset(tab_id, portal_host));
    }

    let params = query_params(&parsed);
    events.extend(
        group_filter_params(&params)
            .into_iter()
            .filter_map(|group| event_from_group(group, tab_id, portal_host)),
    );
    Ok(events)
}

pub(crate) fn event_from_group(group: ParamGroup, tab_id: TabId, portal_host: &str) -> Option<FilterEvent> {
    if classify_field(&group.field).is_none() {
        debug!("Ignoring unrecognized filter field '{}'", group.field);
        return None;
    }

    let Some(action) = group.action() else {
        debug!("Ignoring unknown filterType for '{}'", group.field);
        return None;
    };

    let value = if group.is_range() {
        if is_range_dropped(&group.field) {
            debug!("Dropping range filter on '{}'", group.field);
            return None;
        }
        Some(group.range.join(RANGE_SEPARATOR))
    } else {
        group.value
    };

    match action {
        FilterAction::Add => {
            let value = value.filter(|v| !v.is_empty())?;
            Some(FilterEvent::add(tab_id, portal_host, group.field, value))
        }
        FilterAction::Remove => Some(FilterEvent::remove(
            tab_id,
            portal_host,
            group.field,
            value.unwrap_or_default(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://acme.bynder.com/api/v4/search/assets/";

    fn interpreter() -> Interpreter {
        Interpreter::new(&TrackerConfig::default())
    }

    fn request(query: &str) -> Option<FilterEvent> {
        interpreter()
            .interpret_request(&format!("{}?{}", BASE, query), 1)
            .unwrap()
    }

    #[test]
    fn test_reset_markers() {
        assert!(has_reset_marker("resetsearch"));
        assert!(has_reset_marker("a=1&resetSearch=1"));
        assert!(has_reset_marker("clearfilters"));
        assert!(has_reset_marker("ClearFilters=1"));
        assert!(has_reset_marker("page=1&reset=true"));
        assert!(!has_reset_marker("reset=false"));
        assert!(!has_reset_marker("preset=true"));

        for query in ["resetSearch", "resetsearch", "clearfilters", "reset=true"] {
            assert_eq!(request(query), Some(FilterEvent::reset(1, "acme.bynder.com")));
        }
    }

    #[test]
    fn test_reset_wins_over_triple() {
        assert_eq!(
            request("resetsearch&field=tags&value=hero&filterType=add"),
            Some(FilterEvent::reset(1, "acme.bynder.com"))
        );
    }

    #[test]
    fn test_add_and_remove() {
        assert_eq!(
            request("field=metaproperty_Color&value=Red&filterType=add"),
            Some(FilterEvent::add(1, "acme.bynder.com", "metaproperty_Color", "Red"))
        );
        assert_eq!(
            request("field=tags&value=hero&filterType=remove"),
            Some(FilterEvent::remove(1, "acme.bynder.com", "tags", "hero"))
        );
        assert_eq!(
            request("field=singletext&filterType=remove"),
            Some(FilterEvent::remove(1, "acme.bynder.com", "singletext", ""))
        );
    }

    #[test]
    fn test_values_are_decoded() {
        assert_eq!(
            request("field=text&value=red+car%26co&filterType=add"),
            Some(FilterEvent::add(1, "acme.bynder.com", "text", "red car&co"))
        );
    }

    #[test]
    fn test_drops_incomplete_or_unknown() {
        assert_eq!(request("field=tags&filterType=add"), None);
        assert_eq!(request("field=tags&value=&filterType=add"), None);
        assert_eq!(request("field=viewType&value=grid&filterType=add"), None);
        assert_eq!(request("field=tags&value=x&filterType=toggle"), None);
        assert_eq!(request("value=x&filterType=add"), None);
    }

    #[test]
    fn test_range_values() {
        assert_eq!(
            request("field=fileSize&value[]=10&value[]=20&filterType=add"),
            Some(FilterEvent::add(1, "acme.bynder.com", "fileSize", "10 - 20"))
        );
        assert_eq!(
            request("field=dateCreated&value[]=2024-01-01&value[]=2024-02-01&filterType=add"),
            None
        );
        // Single-valued submissions of range fields are still tracked
        assert_eq!(
            request("field=dateCreated&value=2024-01-01&filterType=add"),
            Some(FilterEvent::add(1, "acme.bynder.com", "dateCreated", "2024-01-01"))
        );
    }

    #[test]
    fn test_gate() {
        let interpreter = interpreter();
        assert!(interpreter.is_filter_request(&format!("{}?field=tags", BASE)));
        assert!(!interpreter.is_filter_request("https://acme.bynder.com/media/?field=tags"));
        assert!(!interpreter.is_filter_request(BASE));
        assert_eq!(
            interpreter
                .interpret_request("https://acme.bynder.com/media/?field=tags&value=x", 1)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_invalid_url() {
        let err = interpreter()
            .interpret_request("https://[bad/search/assets/?field=tags&value=x", 1)
            .unwrap_err();
        assert!(matches!(err, InterpretError::InvalidUrl { .. }));
        assert!(interpret_search_url("not a url", 1).is_err());
    }

    #[test]
    fn test_search_url_yields_every_group() {
        let events = interpret_search_url(
            "https://acme.bynder.com/search/set/?resetsearch&field=metaproperty_Color&value=Red\
             &filterType=add&field=tags&value=hero&field=page&value=2\
             &field=text&value=logo&filterType=remove",
            5,
        )
        .unwrap();

        assert_eq!(
            events,
            vec![
                FilterEvent::reset(5, "acme.bynder.com"),
                FilterEvent::add(5, "acme.bynder.com", "metaproperty_Color", "Red"),
                FilterEvent::add(5, "acme.bynder.com", "tags", "hero"),
                FilterEvent::remove(5, "acme.bynder.com", "text", "logo"),
            ]
        );
    }
}
