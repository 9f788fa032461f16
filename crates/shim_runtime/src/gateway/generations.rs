//! Logical-to-physical cache generation registry.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::GatewayError;

/// Logical cache holding the pre-cached application resources.
pub const APP_CACHE: &str = "app";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
/// Explicit mapping from logical cache name to the physical cache of the current generation.
///
/// Every physical cache not named here is stale.
pub struct CacheGenerations {
    caches: BTreeMap<String, String>,
}

impl CacheGenerations {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this registry with `logical` pointing at `physical`.
    pub fn with_cache(mut self, logical: impl Into<String>, physical: impl Into<String>) -> Self {
        self.caches.insert(logical.into(), physical.into());
        self
    }

    /// Builds a registry naming each logical cache `<name>-v<version>`.
    pub fn versioned<I, S>(names: I, version: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let caches = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                let physical = format!("{name}-v{version}");
                (name, physical)
            })
            .collect();
        Self { caches }
    }

    /// Returns the current physical cache for `logical`.
    pub fn current(&self, logical: &str) -> Option<&str> {
        self.caches.get(logical).map(String::as_str)
    }

    /// Returns the set of physical caches that must survive activation.
    pub fn desired(&self) -> BTreeSet<&str> {
        self.caches.values().map(String::as_str).collect()
    }

    /// Returns the number of logical caches.
    pub fn len(&self) -> usize {
        self.caches.len()
    }

    /// Returns whether no logical cache is configured.
    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    /// Rejects empty names and two logical caches sharing one physical cache.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] describing the first offending entry.
    pub fn validate(&self) -> Result<(), GatewayError> {
        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
        for (logical, physical) in &self.caches {
            if logical.trim().is_empty() || physical.trim().is_empty() {
                return Err(GatewayError::Config(format!(
                    "cache names must not be empty (`{logical}` -> `{physical}`)"
                )));
            }
            if let Some(other) = seen.insert(physical.as_str(), logical.as_str()) {
                return Err(GatewayError::Config(format!(
                    "physical cache `{physical}` is claimed by both `{other}` and `{logical}`"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versioned_registry_names_each_generation() {
        let generations = CacheGenerations::versioned(["app", "fonts"], 3);
        assert_eq!(generations.current("app"), Some("app-v3"));
        assert_eq!(generations.current("fonts"), Some("fonts-v3"));
        assert_eq!(generations.current("missing"), None);
        assert_eq!(
            generations.desired(),
            BTreeSet::from(["app-v3", "fonts-v3"])
        );
        assert!(!generations.desired().contains("app-v2"));
        assert_eq!(generations.len(), 2);
    }

    #[test]
    fn validate_rejects_shared_physical_cache() {
        let generations = CacheGenerations::new()
            .with_cache("app", "shared")
            .with_cache("fonts", "shared");
        let err = generations.validate().expect_err("collision");
        assert_eq!(
            err,
            GatewayError::Config(
                "physical cache `shared` is claimed by both `app` and `fonts`".to_string()
            )
        );
    }

    #[test]
    fn validate_rejects_blank_names() {
        let generations = CacheGenerations::new().with_cache("app", " ");
        assert!(generations.validate().is_err());
        assert!(CacheGenerations::versioned(["app"], 1).validate().is_ok());
    }

    #[test]
    fn registry_serializes_as_plain_map() {
        let generations = CacheGenerations::new().with_cache("app", "app-v7");
        let raw = serde_json::to_string(&generations).expect("serialize");
        assert_eq!(raw, r#"{"app":"app-v7"}"#);
        let parsed: CacheGenerations = serde_json::from_str(&raw).expect("deserialize");
        assert_eq!(parsed, generations);
    }
}
