//! Core type definitions for Filterlink
//!
//! These types describe the filters a portal search can carry. The JSON shape
//! (camelCase, `type`-tagged entries) is what the popup and the persisted
//! snapshot both consume.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fields::{
    sanitize_property, AUTOMATED_TAG_FIELD, MANUAL_TAG_FIELD, METAPROPERTY_PREFIX, SEARCH_FIELD,
};

// =============================================================================
// Filter Entries
// =============================================================================

/// Origin of a tag filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    /// Tag applied by a person
    #[default]
    Manual,
    /// Tag produced by the portal's automatic tagging
    Automated,
}

/// A single active filter condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FilterEntry {
    /// Custom attribute facet (`metaproperty_<rawKey>`)
    #[serde(rename_all = "camelCase")]
    Metaproperty {
        /// Display label derived from the raw key
        property: String,
        /// Field identifier without the `metaproperty_` prefix
        raw_key: String,
        value: String,
    },
    Tag {
        value: String,
        #[serde(rename = "tagType", default)]
        kind: TagKind,
    },
    /// Free-text keyword
    #[serde(rename = "search")]
    SearchTerm { value: String },
    /// Advanced, boolean and range filters
    #[serde(rename = "status")]
    StatusFlag { field: String, value: String },
}

impl FilterEntry {
    /// The field name this entry is submitted under when rebuilding a URL.
    pub fn field_name(&self) -> String {
        match self {
            Self::Metaproperty { raw_key, .. } => format!("{}{}", METAPROPERTY_PREFIX, raw_key),
            Self::Tag { kind: TagKind::Manual, .. } => MANUAL_TAG_FIELD.to_string(),
            Self::Tag { kind: TagKind::Automated, .. } => AUTOMATED_TAG_FIELD.to_string(),
            Self::SearchTerm { .. } => SEARCH_FIELD.to_string(),
            Self::StatusFlag { field, .. } => field.clone(),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Metaproperty { value, .. }
            | Self::Tag { value, .. }
            | Self::SearchTerm { value }
            | Self::StatusFlag { value, .. } => value,
        }
    }

    /// Key used when the submitted field is not known.
    pub fn default_key(&self) -> FilterKey {
        FilterKey::new(self.field_name(), self.value())
    }

    pub fn is_search_term(&self) -> bool {
        matches!(self, Self::SearchTerm { .. })
    }
}

// =============================================================================
// Composite Key
// =============================================================================

/// Composite `(field, value)` key. At most one entry exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterKey {
    pub field: String,
    pub value: String,
}

impl FilterKey {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Parse the persisted `field:value` form. The value may itself contain `:`.
    pub fn parse(s: &str) -> Option<Self> {
        let (field, value) = s.split_once(':')?;
        if field.is_empty() {
            return None;
        }
        Some(Self::new(field, value))
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.value)
    }
}

// =============================================================================
// Filter Set
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct MetapropertyFilter {
    pub property: String,
    #[serde(rename = "rawKey", alias = "rawProperty", default)]
    pub raw_key: String,
    pub value: String,
}

impl MetapropertyFilter {
    /// Key submitted in URLs. Sets built by hand may omit `rawKey`, in which
    /// case it is derived from the label.
    pub fn submitted_key(&self) -> String {
        if self.raw_key.is_empty() {
            sanitize_property(&self.property)
        } else {
            self.raw_key.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TagFilter {
    pub value: String,
    #[serde(rename = "tagType", default)]
    pub kind: TagKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SearchFilter {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct StatusFilter {
    pub field: String,
    pub value: String,
}

/// Read-only view of a tab's filters, grouped by kind.
///
/// Each group keeps the order the entries were stored in, so URL generation
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct FilterSet {
    #[serde(default)]
    pub metaproperties: Vec<MetapropertyFilter>,
    #[serde(default)]
    pub tags: Vec<TagFilter>,
    #[serde(default)]
    pub search: Vec<SearchFilter>,
    #[serde(default)]
    pub status: Vec<StatusFilter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group entries by kind, preserving their relative order.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a FilterEntry>,
    {
        let mut set = Self::new();
        for entry in entries {
            set.push(entry.clone());
        }
        set
    }

    pub fn push(&mut self, entry: FilterEntry) {
        match entry {
            FilterEntry::Metaproperty { property, raw_key, value } => {
                self.metaproperties.push(MetapropertyFilter { property, raw_key, value })
            }
            FilterEntry::Tag { value, kind } => self.tags.push(TagFilter { value, kind }),
            FilterEntry::SearchTerm { value } => self.search.push(SearchFilter { value }),
            FilterEntry::StatusFlag { field, value } => {
                self.status.push(StatusFilter { field, value })
            }
        }
    }

    /// Entries in URL order: metaproperties, tags, search terms, status flags.
    pub fn entries(&self) -> Vec<FilterEntry> {
        let mut out = Vec::with_capacity(self.total());
        out.extend(self.metaproperties.iter().map(|m| FilterEntry::Metaproperty {
            property: m.property.clone(),
            raw_key: m.submitted_key(),
            value: m.value.clone(),
        }));
        out.extend(self.tags.iter().map(|t| FilterEntry::Tag {
            value: t.value.clone(),
            kind: t.kind,
        }));
        out.extend(self.search.iter().map(|s| FilterEntry::SearchTerm {
            value: s.value.clone(),
        }));
        out.extend(self.status.iter().map(|s| FilterEntry::StatusFlag {
            field: s.field.clone(),
            value: s.value.clone(),
        }));
        out
    }

    pub fn total(&self) -> usize {
        self.metaproperties.len() + self.tags.len() + self.search.len() + self.status.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn has_filters(&self) -> bool {
        !self.is_empty()
    }

    pub fn has_metaproperties(&self) -> bool {
        !self.metaproperties.is_empty()
    }

    /// Human-readable count shown in the popup, e.g. `2 options + 1 keyword`.
    pub fn summary(&self) -> String {
        let manual = self.tags.iter().filter(|t| t.kind == TagKind::Manual).count();
        let automated = self.tags.len() - manual;

        let counts = [
            (self.metaproperties.len(), "option"),
            (manual, "manual tag"),
            (automated, "automated tag"),
            (self.search.len(), "keyword"),
            (self.status.len(), "advanced filter"),
        ];

        let parts: Vec<String> = counts
            .iter()
            .filter(|(count, _)| *count > 0)
            .map(|(count, noun)| {
                let plural = if *count == 1 { "" } else { "s" };
                format!("{} {}{}", count, noun, plural)
            })
            .collect();

        if parts.is_empty() {
            "No filters active".to_string()
        } else {
            parts.join(" + ")
        }
    }
}
