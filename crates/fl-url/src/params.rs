//! Query parameter grouping
//!
//! A search URL can carry several filters as repeated parameters:
//!
//! ```text
//! field=tags&value=hero&filterType=add&field=metaproperty_Size&value[]=10&value[]=20
//! ```
//!
//! Each `field` parameter opens a group that collects the `value`, `value[]`
//! and `filterType` parameters after it, until the next `field` or until
//! [`GROUP_LOOKAHEAD`] parameters have been inspected. Unrelated parameters
//! inside the window are skipped.

use url::Url;

/// Parameters inspected after each `field` parameter.
pub const GROUP_LOOKAHEAD: usize = 8;

const FIELD_KEY: &str = "field";
const VALUE_KEY: &str = "value";
const RANGE_VALUE_KEY: &str = "value[]";
const FILTER_TYPE_KEY: &str = "filterType";

/// Decoded query parameters in URL order.
pub fn query_params(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// Requested operation of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    Add,
    Remove,
}

/// One `field` parameter and the parameters that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamGroup {
    pub field: String,
    /// First plain `value`
    pub value: Option<String>,
    /// Every `value[]`, in order
    pub range: Vec<String>,
    /// First `filterType`
    pub filter_type: Option<String>,
}

impl ParamGroup {
    fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
            value: None,
            range: Vec::new(),
            filter_type: None,
        }
    }

    /// `add` when no `filterType` was given, `None` for unknown types.
    pub fn action(&self) -> Option<FilterAction> {
        match self.filter_type.as_deref() {
            None | Some("add") => Some(FilterAction::Add),
            Some("remove") => Some(FilterAction::Remove),
            Some(_) => None,
        }
    }

    pub fn is_range(&self) -> bool {
        !self.range.is_empty()
    }
}

/// Group `field` parameters with their values and filter types.
pub fn group_filter_params(params: &[(String, String)]) -> Vec<ParamGroup> {
    let mut groups = Vec::new();

    for (i, (key, field)) in params.iter().enumerate() {
        if key != FIELD_KEY {
            continue;
        }

        let mut group = ParamGroup::new(field);
        for (key, value) in params.iter().skip(i + 1).take(GROUP_LOOKAHEAD) {
            match key.as_str() {
                FIELD_KEY => break,
                VALUE_KEY if group.value.is_none() => group.value = Some(value.clone()),
                RANGE_VALUE_KEY => group.range.push(value.clone()),
                FILTER_TYPE_KEY if group.filter_type.is_none() => {
                    group.filter_type = Some(value.clone())
                }
                _ => {}
            }
        }
        groups.push(group);
    }

    groups
}
