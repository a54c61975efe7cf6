//! Platform directories for the store, config file and logs.

use crate::error::NamespaceError;
use directories::ProjectDirs;
use std::path::PathBuf;

fn project_dirs() -> Result<ProjectDirs, NamespaceError> {
    ProjectDirs::from("", "nsmeta", "nsmeta").ok_or_else(|| {
        NamespaceError::ConfigError("Could not determine platform home directory".to_string())
    })
}

/// Default store directory (e.g. ~/.local/share/nsmeta/store)
pub fn default_store_path() -> Result<PathBuf, NamespaceError> {
    Ok(project_dirs()?.data_dir().join("store"))
}

/// Default config file (e.g. ~/.config/nsmeta/config.toml)
pub fn default_config_path() -> Result<PathBuf, NamespaceError> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

/// Default log file in the platform state directory
pub fn default_log_file_path() -> Result<PathBuf, NamespaceError> {
    let dirs = project_dirs()?;
    let state_dir = dirs.state_dir().ok_or_else(|| {
        NamespaceError::ConfigError("Platform state directory not available for log file".to_string())
    })?;
    Ok(state_dir.join("nsmeta.log"))
}
