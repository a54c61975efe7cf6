//! Error types for the namespace and its backing store.

use thiserror::Error;

/// Errors raised by the transactional store layer
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid store path: {0}")]
    InvalidPath(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Transaction conflict on {0}")]
    Conflict(String),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        match err {
            sled::Error::Io(e) => StorageError::IoError(e),
            other => StorageError::Backend(other.to_string()),
        }
    }
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Errors surfaced by namespace operations
#[derive(Debug, Error)]
pub enum NamespaceError {
    #[error("{0}")]
    NotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Unresolved symlink in {path}: {preceding} -> {target}, remainder {remainder:?}")]
    UnresolvedSymlink {
        path: String,
        preceding: String,
        remainder: String,
        target: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl NamespaceError {
    /// True when the error came from a commit losing a first-committer-wins race
    pub fn is_conflict(&self) -> bool {
        matches!(self, NamespaceError::Storage(StorageError::Conflict(_)))
    }
}

impl From<config::ConfigError> for NamespaceError {
    fn from(err: config::ConfigError) -> Self {
        NamespaceError::ConfigError(err.to_string())
    }
}
