//! ConfigLoader facade delegating to the merge service.

use super::merge::MergeService;
use super::NamespaceConfig;
use crate::error::NamespaceError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<NamespaceConfig, NamespaceError> {
        MergeService::load(path)
    }

    /// Create default configuration.
    pub fn default() -> NamespaceConfig {
        NamespaceConfig::default()
    }

    /// Render a configuration as TOML.
    pub fn to_toml(config: &NamespaceConfig) -> Result<String, NamespaceError> {
        toml::to_string_pretty(config)
            .map_err(|e| NamespaceError::ConfigError(format!("Failed to render config: {}", e)))
    }
}
