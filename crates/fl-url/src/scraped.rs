//! Scraped-filter classification
//!
//! When a tab has no tracked state, the content script scrapes the page for
//! visible filters: pills, checked facet inputs and the page URL itself. The
//! DOM walking happens in JavaScript; this module decides what each scraped
//! piece means.

use log::warn;
use percent_encoding::percent_decode_str;
use url::form_urlencoded;

use fl_core::fields::{metaproperty_label, sanitize_property, METAPROPERTY_PREFIX};
use fl_core::url::{extract_fragment, extract_query};
use fl_core::{FilterEntry, FilterSet, TagKind};

const DEFAULT_STATUS_FIELD: &str = "status";

/// `Label: value` text as a metaproperty. The value may itself contain `:`.
fn labelled_metaproperty(text: &str) -> Option<FilterEntry> {
    let (label, value) = text.split_once(':')?;
    let (label, value) = (label.trim(), value.trim());
    if label.is_empty() || value.is_empty() {
        return None;
    }
    Some(FilterEntry::Metaproperty {
        property: label.to_string(),
        raw_key: sanitize_property(label),
        value: value.to_string(),
    })
}

fn manual_tag(value: &str) -> FilterEntry {
    FilterEntry::Tag {
        value: value.to_string(),
        kind: TagKind::Manual,
    }
}

/// Classify the text of a filter pill.
///
/// `type_hint` is the pill's `data-filter-type` (or `data-filter`) attribute.
/// With a hint, only `metaproperty` and `tag` hints produce anything. Without
/// one the text decides: any `:` means a `Label: value` metaproperty (so
/// `Tag: hero` is a metaproperty labelled `Tag`), anything else is a tag.
pub fn classify_pill(text: &str, type_hint: Option<&str>) -> Option<FilterEntry> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(hint) = type_hint.filter(|h| !h.is_empty()) {
        return if hint.contains("metaproperty") {
            labelled_metaproperty(text)
        } else if hint == "tag" {
            Some(manual_tag(text))
        } else {
            None
        };
    }

    if text.contains(':') {
        return labelled_metaproperty(text);
    }
    Some(manual_tag(text))
}

/// Kind of facet section a checked input sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Metaproperty,
    Tag,
    Status,
}

fn section_kind(hint: &str) -> Option<Section> {
    let hint = hint.to_ascii_lowercase();
    if ["metapropert", "custom", "attribute"].iter().any(|k| hint.contains(k)) {
        Some(Section::Metaproperty)
    } else if hint.contains("tag") {
        Some(Section::Tag)
    } else if hint.contains("status") || hint.contains("state") {
        Some(Section::Status)
    } else {
        None
    }
}

/// Classify a checked facet input.
///
/// `section_hint` is the enclosing section's type attribute, class name or
/// heading. `data_field` and `data_value` are the input's `data-field` and
/// `data-value` attributes.
pub fn classify_checked(
    text: &str,
    section_hint: Option<&str>,
    data_field: Option<&str>,
    data_value: Option<&str>,
) -> Option<FilterEntry> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    match section_hint.and_then(section_kind)? {
        Section::Metaproperty => labelled_metaproperty(text),
        Section::Tag => Some(manual_tag(text)),
        Section::Status => Some(FilterEntry::StatusFlag {
            field: data_field.unwrap_or(DEFAULT_STATUS_FIELD).to_string(),
            value: data_value.unwrap_or(text).to_string(),
        }),
    }
}

/// Filters visible in a page URL: `metaproperty_*`, comma-separated `tags`,
/// `search`/`q` terms, and a `#filters=<json>` fragment.
pub fn filters_from_page_url(url: &str) -> FilterSet {
    let mut filters = FilterSet::new();

    if let Some(query) = extract_query(url) {
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if let Some(raw_key) = key.strip_prefix(METAPROPERTY_PREFIX) {
                filters.push(FilterEntry::Metaproperty {
                    property: metaproperty_label(raw_key),
                    raw_key: raw_key.to_string(),
                    value: value.into_owned(),
                });
            } else if key == "tags" {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .for_each(|tag| filters.push(manual_tag(tag)));
            } else if key == "search" || key == "q" {
                filters.push(FilterEntry::SearchTerm {
                    value: value.into_owned(),
                });
            }
        }
    }

    if let Some(embedded) = extract_fragment(url).and_then(fragment_filters) {
        filters.metaproperties.extend(embedded.metaproperties);
        filters.tags.extend(embedded.tags);
        filters.search.extend(embedded.search);
        filters.status.extend(embedded.status);
    }

    filters
}

fn fragment_filters(fragment: &str) -> Option<FilterSet> {
    let start = fragment.find("filters=")? + "filters=".len();
    let encoded = fragment[start..].split('&').next().unwrap_or_default();
    if encoded.is_empty() {
        return None;
    }

    let json = percent_decode_str(encoded).decode_utf8_lossy();
    match serde_json::from_str(&json) {
        Ok(filters) => Some(filters),
        Err(e) => {
            warn!("Ignoring malformed filters fragment: {}", e);
            None
        }
    }
}
