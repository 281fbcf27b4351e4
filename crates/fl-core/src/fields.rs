//! Portal filter field allow-list
//!
//! Every field the portal submits is looked up in [`FIELD_TABLE`]. Fields that
//! match nothing are ignored, which keeps the tracker tolerant of parameters the
//! portal adds over time.

use crate::types::{FilterEntry, TagKind};

pub const METAPROPERTY_PREFIX: &str = "metaproperty_";
pub const MANUAL_TAG_FIELD: &str = "tags";
pub const AUTOMATED_TAG_FIELD: &str = "autotags";
/// Field used when emitting search terms.
pub const SEARCH_FIELD: &str = "text";
/// Free-text fields accepted on input.
pub const SEARCH_FIELDS: &[&str] = &["text", "singletext"];

/// Advanced, boolean and range fields tracked as status flags.
pub const STATUS_FIELDS: &[&str] = &[
    "archive",
    "isPublic",
    "watermarked",
    "limited",
    "audit",
    "copyright",
    "brandId",
    "subBrandId",
    "type",
    "extension",
    "orientation",
    "fileSize",
    "dateCreated",
    "dateModified",
    "datePublished",
    "resolution",
];

/// Range submissions (`value[]`) of these fields are dropped entirely: the
/// portal cannot rebuild them from a joined value.
pub const RANGE_DROPPED_FIELDS: &[&str] = &[
    "dateCreated",
    "dateModified",
    "datePublished",
    "resolution",
];

/// Separator used to join `value[]` range submissions.
pub const RANGE_SEPARATOR: &str = " - ";

// =============================================================================
// Field Table
// =============================================================================

/// Entry constructor a field maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Metaproperty,
    ManualTag,
    AutomatedTag,
    SearchTerm,
    StatusFlag,
}

#[derive(Debug, Clone, Copy)]
enum FieldPattern {
    Exact(&'static str),
    /// Prefix followed by at least one character
    Prefix(&'static str),
    OneOf(&'static [&'static str]),
}

impl FieldPattern {
    fn matches(self, field: &str) -> bool {
        match self {
            Self::Exact(name) => field == name,
            Self::Prefix(prefix) => field.len() > prefix.len() && field.starts_with(prefix),
            Self::OneOf(names) => names.contains(&field),
        }
    }
}

struct FieldRule {
    pattern: FieldPattern,
    kind: FieldKind,
}

static FIELD_TABLE: &[FieldRule] = &[
    FieldRule { pattern: FieldPattern::Prefix(METAPROPERTY_PREFIX), kind: FieldKind::Metaproperty },
    FieldRule { pattern: FieldPattern::Exact(MANUAL_TAG_FIELD), kind: FieldKind::ManualTag },
    FieldRule { pattern: FieldPattern::Exact(AUTOMATED_TAG_FIELD), kind: FieldKind::AutomatedTag },
    FieldRule { pattern: FieldPattern::OneOf(SEARCH_FIELDS), kind: FieldKind::SearchTerm },
    FieldRule { pattern: FieldPattern::OneOf(STATUS_FIELDS), kind: FieldKind::StatusFlag },
];

/// Look a submitted field name up in the allow-list.
pub fn classify_field(field: &str) -> Option<FieldKind> {
    FIELD_TABLE
        .iter()
        .find(|rule| rule.pattern.matches(field))
        .map(|rule| rule.kind)
}

impl FieldKind {
    /// Build the entry for `field=value`. `field` must have classified as `self`.
    pub fn build_entry(self, field: &str, value: &str) -> FilterEntry {
        match self {
            Self::Metaproperty => {
                let raw_key = field.strip_prefix(METAPROPERTY_PREFIX).unwrap_or(field);
                FilterEntry::Metaproperty {
                    property: metaproperty_label(raw_key),
                    raw_key: raw_key.to_string(),
                    value: value.to_string(),
                }
            }
            Self::ManualTag => FilterEntry::Tag {
                value: value.to_string(),
                kind: TagKind::Manual,
            },
            Self::AutomatedTag => FilterEntry::Tag {
                value: value.to_string(),
                kind: TagKind::Automated,
            },
            Self::SearchTerm => FilterEntry::SearchTerm {
                value: value.to_string(),
            },
            Self::StatusFlag => FilterEntry::StatusFlag {
                field: field.to_string(),
                value: value.to_string(),
            },
        }
    }
}

/// Classify and build in one step.
pub fn entry_for(field: &str, value: &str) -> Option<FilterEntry> {
    classify_field(field).map(|kind| kind.build_entry(field, value))
}

#[inline]
pub fn is_search_field(field: &str) -> bool {
    SEARCH_FIELDS.contains(&field)
}

#[inline]
pub fn is_range_dropped(field: &str) -> bool {
    RANGE_DROPPED_FIELDS.contains(&field)
}

/// Display label for a raw metaproperty key: underscores become spaces.
pub fn metaproperty_label(raw_key: &str) -> String {
    raw_key.replace('_', " ")
}

/// Raw metaproperty key for a display label: every character outside
/// `[A-Za-z0-9-]` becomes `_`.
pub fn sanitize_property(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
