//! Deep-link codec
//!
//! Pure conversions between a [`FilterSet`] and the portal's own URL
//! conventions.
//!
//! Query encoding, one `field/value/filterType` triple per entry:
//!
//! ```text
//! https://<host>/search/set/?resetsearch&field=metaproperty_Color&value=Red&filterType=add
//! ```
//!
//! Predictable encoding, metaproperties only:
//!
//! ```text
//! https://<host>/match/Color/Red/Size/Large/
//! ```
//!
//! Range submissions of the date and resolution fields never reach a filter
//! set, so they are never part of a round trip.

use indexmap::IndexMap;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::form_urlencoded;

use fl_core::fields::{entry_for, METAPROPERTY_PREFIX};
use fl_core::{FilterEntry, FilterEvent, FilterKey, FilterSet, TabId};

use crate::interpreter::{interpret_search_url, parse_url, InterpretError};

/// Unfiltered asset listing.
pub const LISTING_PATH: &str = "/media/";
/// Endpoint for filter sets with metaproperties.
pub const SAVED_SET_PATH: &str = "/search/set/";
/// Endpoint for every other filter set.
pub const SEARCH_PATH: &str = "/search/media/";
pub const PREDICTABLE_ROOT: &str = "/match/";
/// Leading parameter that makes the portal start from a clean search.
pub const RESET_PARAM: &str = "resetsearch";

/// Characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

// Tab id used while decoding; the events never reach a store.
const DECODE_TAB: TabId = -1;

fn form_encode(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Bare listing URL for a portal.
pub fn listing_url(portal_host: &str) -> String {
    format!("https://{}{}", portal_host, LISTING_PATH)
}

/// Build the shareable search URL for a filter set.
pub fn encode(portal_host: &str, filters: &FilterSet) -> String {
    if filters.is_empty() {
        return listing_url(portal_host);
    }

    let triples: Vec<String> = filters
        .entries()
        .iter()
        .map(|entry| {
            format!(
                "field={}&value={}&filterType=add",
                form_encode(&entry.field_name()),
                form_encode(entry.value())
            )
        })
        .collect();

    let endpoint = if filters.has_metaproperties() {
        SAVED_SET_PATH
    } else {
        SEARCH_PATH
    };

    format!(
        "https://{}{}?{}&{}",
        portal_host,
        endpoint,
        RESET_PARAM,
        triples.join("&")
    )
}

/// Build the path-segment URL covering the filter set's metaproperties.
/// Pairs with an empty key or value have no segment form and are skipped.
pub fn encode_predictable(portal_host: &str, filters: &FilterSet) -> String {
    let mut url = format!("https://{}{}", portal_host, PREDICTABLE_ROOT);
    for meta in &filters.metaproperties {
        let key = meta.submitted_key();
        if key.is_empty() || meta.value.is_empty() {
            continue;
        }
        url.push_str(&utf8_percent_encode(&key, COMPONENT).to_string());
        url.push('/');
        url.push_str(&utf8_percent_encode(&meta.value, COMPONENT).to_string());
        url.push('/');
    }
    url
}

/// Rebuild the filter set a search URL encodes. Only additions count.
pub fn decode(url: &str) -> Result<FilterSet, InterpretError> {
    let mut entries: IndexMap<FilterKey, FilterEntry> = IndexMap::new();

    for event in interpret_search_url(url, DECODE_TAB)? {
        if let FilterEvent::Add { field, value, .. } = event {
            if let Some(entry) = entry_for(&field, &value) {
                entries.insert(FilterKey::new(field, value), entry);
            }
        }
    }

    Ok(FilterSet::from_entries(entries.values()))
}

/// Rebuild the metaproperties of a predictable URL. A trailing key without a
/// value is ignored.
pub fn decode_predictable(url: &str) -> Result<FilterSet, InterpretError> {
    let parsed = parse_url(url)?;
    let Some(rest) = parsed.path().strip_prefix(PREDICTABLE_ROOT) else {
        return Ok(FilterSet::new());
    };

    let segments: Vec<String> = rest
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        .collect();

    let mut entries: IndexMap<FilterKey, FilterEntry> = IndexMap::new();
    for pair in segments.chunks_exact(2) {
        let field = format!("{}{}", METAPROPERTY_PREFIX, pair[0]);
        if let Some(entry) = entry_for(&field, &pair[1]) {
            entries.insert(FilterKey::new(field, pair[1].clone()), entry);
        }
    }

    Ok(FilterSet::from_entries(entries.values()))
}
