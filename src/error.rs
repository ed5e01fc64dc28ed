//! Error types for fileutil
//!
//! All modules use `FsResult<T>` as their return type.

use crate::fs::ErrorClass;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for fileutil operations
pub type FsResult<T> = Result<T, FsError>;

/// All errors that can occur in fileutil
#[derive(Error, Debug)]
pub enum FsError {
    // Filesystem errors
    #[error("{op} failed for {path}: {source}")]
    Io {
        op: &'static str,
        path: String,
        #[source]
        source: Arc<io::Error>,
    },

    // Template errors
    #[error("Failed to compile template {name}: {reason}")]
    Template { name: String, reason: String },

    // Resource expansion errors
    #[error("Invalid path spec: {0}")]
    InvalidSpec(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // Logging errors
    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

impl FsError {
    /// Create an IO error for an operation on a path
    pub fn io(op: &'static str, path: impl Into<String>, source: io::Error) -> Self {
        Self::shared_io(op, path, Arc::new(source))
    }

    /// Create an IO error from a source shared with other waiters
    pub fn shared_io(op: &'static str, path: impl Into<String>, source: Arc<io::Error>) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Classify the underlying filesystem failure, if any
    pub fn class(&self) -> Option<ErrorClass> {
        match self {
            Self::Io { source, .. } => Some(ErrorClass::of(source)),
            _ => None,
        }
    }

    /// Check if this error reports a missing path
    pub fn is_not_found(&self) -> bool {
        self.class() == Some(ErrorClass::NotFound)
    }
}
