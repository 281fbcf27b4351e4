//! Tracker configuration
//!
//! Defaults match the hosted Bynder portals. Every field is optional in JSON,
//! so a config file only needs the values it overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::snapshot::DEFAULT_STORAGE_KEY;

/// Grace windows applied to navigation notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GracePolicy {
    /// Navigations this soon after a mutation are redirect noise
    #[serde(rename = "afterMutationMs", with = "duration_ms")]
    pub after_mutation: Duration,
    /// Navigations this soon after a reset are ignored
    #[serde(rename = "afterResetMs", with = "duration_ms")]
    pub after_reset: Duration,
}

impl Default for GracePolicy {
    fn default() -> Self {
        Self {
            after_mutation: Duration::from_secs(5),
            after_reset: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerConfig {
    /// Host suffix identifying portal sites
    pub portal_domain: String,
    /// Path fragment of the portal's asset search requests
    pub search_path: String,
    /// Key the snapshot is stored under
    pub storage_key: String,
    pub grace: GracePolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            portal_domain: ".bynder.com".to_string(),
            search_path: "/search/assets/".to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            grace: GracePolicy::default(),
        }
    }
}

impl TrackerConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether `host` belongs to a portal.
    pub fn is_portal_host(&self, host: &str) -> bool {
        if host.is_empty() {
            return false;
        }
        let host = host.to_ascii_lowercase();
        let domain = self.portal_domain.to_ascii_lowercase();
        if domain.starts_with('.') {
            host.ends_with(&domain)
        } else {
            host == domain || host.ends_with(&format!(".{}", domain))
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.grace.after_mutation, Duration::from_secs(5));
        assert_eq!(config.grace.after_reset, Duration::from_secs(3));
        assert_eq!(config.storage_key, "filterState");
    }

    #[test]
    fn test_partial_json() {
        let config = TrackerConfig::from_json(r#"{"grace":{"afterResetMs":1500}}"#).unwrap();
        assert_eq!(config.grace.after_reset, Duration::from_millis(1500));
        assert_eq!(config.grace.after_mutation, Duration::from_secs(5));
        assert_eq!(config.portal_domain, ".bynder.com");
    }

    #[test]
    fn test_is_portal_host() {
        let config = TrackerConfig::default();
        assert!(config.is_portal_host("acme.bynder.com"));
        assert!(config.is_portal_host("ACME.Bynder.com"));
        assert!(!config.is_portal_host("bynder.com.evil.net"));
        assert!(!config.is_portal_host(""));

        let bare = TrackerConfig {
            portal_domain: "assets.example.org".into(),
            ..TrackerConfig::default()
        };
        assert!(bare.is_portal_host("assets.example.org"));
        assert!(bare.is_portal_host("eu.assets.example.org"));
        assert!(!bare.is_portal_host("myassets.example.org"));
    }
}
