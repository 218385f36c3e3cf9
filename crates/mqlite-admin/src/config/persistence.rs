//! Persistence backend selection.

use serde::Deserialize;

/// Backend used when none is configured.
pub const DEFAULT_PERSISTENCE_BACKEND: &str = "memory";

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Name of the registered persistence factory to build.
    ///
    /// Default: `memory`
    pub backend: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: DEFAULT_PERSISTENCE_BACKEND.to_string(),
        }
    }
}

impl PersistenceConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.backend.trim().is_empty() {
            return Err("persistence.backend must not be empty".to_string());
        }
        Ok(())
    }
}
