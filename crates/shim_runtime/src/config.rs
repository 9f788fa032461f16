//! Gateway configuration loaded from JSON.

use serde::{Deserialize, Serialize};

use crate::{gateway::generations::APP_CACHE, CacheGenerations, GatewayError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Static configuration read by the gateway at install and activate time.
///
/// ```json
/// { "generations": { "app": "app-v3" }, "cached_files": ["/index.html", "/app.js"] }
/// ```
pub struct GatewayConfig {
    /// Current generation registry.
    pub generations: CacheGenerations,
    /// Resources pre-populated into the current `app` cache on install, in order.
    #[serde(default)]
    pub cached_files: Vec<String>,
}

impl GatewayConfig {
    /// Builds a configuration from its parts.
    pub fn new(generations: CacheGenerations, cached_files: Vec<String>) -> Self {
        Self {
            generations,
            cached_files,
        }
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] when the document is malformed or fails validation.
    pub fn from_json_str(raw: &str) -> Result<Self, GatewayError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| GatewayError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the generation registry and requires an `app` cache.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] for registry problems and
    /// [`GatewayError::MissingGeneration`] when no `app` cache is configured.
    pub fn validate(&self) -> Result<(), GatewayError> {
        self.generations.validate()?;
        if self.generations.current(APP_CACHE).is_none() {
            return Err(GatewayError::MissingGeneration(APP_CACHE.to_string()));
        }
        Ok(())
    }
}
