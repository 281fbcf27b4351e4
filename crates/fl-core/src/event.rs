//! Filter events
//!
//! The interpreter classifies intercepted URLs into these events; the store is
//! the only consumer.

/// Browser tab handle issued by the host.
pub type TabId = i32;

/// A single change to a tab's filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    /// Clear every filter on the tab
    Reset { tab_id: TabId, portal_host: String },
    /// Add or overwrite the `(field, value)` entry
    Add {
        tab_id: TabId,
        portal_host: String,
        field: String,
        value: String,
    },
    /// Remove the `(field, value)` entry. An empty value removes every entry
    /// of the field.
    Remove {
        tab_id: TabId,
        portal_host: String,
        field: String,
        value: String,
    },
}

impl FilterEvent {
    pub fn reset(tab_id: TabId, portal_host: impl Into<String>) -> Self {
        Self::Reset {
            tab_id,
            portal_host: portal_host.into(),
        }
    }

    pub fn add(
        tab_id: TabId,
        portal_host: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Add {
            tab_id,
            portal_host: portal_host.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn remove(
        tab_id: TabId,
        portal_host: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Remove {
            tab_id,
            portal_host: portal_host.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn tab_id(&self) -> TabId {
        match self {
            Self::Reset { tab_id, .. } | Self::Add { tab_id, .. } | Self::Remove { tab_id, .. } => {
                *tab_id
            }
        }
    }

    pub fn portal_host(&self) -> &str {
        match self {
            Self::Reset { portal_host, .. }
            | Self::Add { portal_host, .. }
            | Self::Remove { portal_host, .. } => portal_host,
        }
    }
}
