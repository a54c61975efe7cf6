//! Configuration
//!
//! Layered configuration for the namespace service: built-in defaults, an
//! optional TOML file, then `NSMETA_*` environment variables (`__` separates
//! nested keys, e.g. `NSMETA_STORAGE__PATH`).

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;

use crate::error::NamespaceError;
use crate::logging::LoggingConfig;
use crate::tree::{PartitionPolicy, PermissionStatus};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamespaceConfig {
    #[serde(default)]
    pub partitioning: PartitionPolicy,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub root: RootConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl NamespaceConfig {
    pub fn validate(&self) -> Result<(), NamespaceError> {
        if self.root.mode > 0o7777 {
            return Err(NamespaceError::ConfigError(format!(
                "Invalid root mode {:o}",
                self.root.mode
            )));
        }
        if self.root.owner.is_empty() {
            return Err(NamespaceError::ConfigError(
                "Root owner must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Location of the persistent record store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store directory; None means the platform data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Store directory with CLI override, then config, then the platform default
    pub fn resolve_path(&self, cli_path: Option<PathBuf>) -> Result<PathBuf, NamespaceError> {
        if let Some(p) = cli_path.filter(|p| !p.as_os_str().is_empty()) {
            return Ok(p);
        }
        if let Some(p) = self.path.clone().filter(|p| !p.as_os_str().is_empty()) {
            return Ok(p);
        }
        paths::default_store_path()
    }
}

/// Ownership of the root directory created by `format`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootConfig {
    #[serde(default = "default_owner")]
    pub owner: String,

    #[serde(default = "default_group")]
    pub group: Option<String>,

    #[serde(default = "default_mode")]
    pub mode: u16,
}

fn default_owner() -> String {
    "hdfs".to_string()
}

fn default_group() -> Option<String> {
    Some("supergroup".to_string())
}

fn default_mode() -> u16 {
    0o755
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            group: default_group(),
            mode: default_mode(),
        }
    }
}

impl RootConfig {
    pub fn permission(&self) -> PermissionStatus {
        PermissionStatus {
            user: self.owner.clone(),
            group: self.group.clone(),
            mode: self.mode,
        }
    }
}
