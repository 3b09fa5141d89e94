//! Error types for preference persistence.

use std::path::PathBuf;

use sitedesk_core::CoreError;
use thiserror::Error;

/// Errors that can occur while loading or persisting preferences.
///
/// An unreadable or outdated preference blob is not an error: the store
/// starts empty instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error on a storage file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding the registry failed.
    #[error("Failed to encode preferences: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Settings file could not be read or written.
    #[error("Invalid settings at {path}: {message}")]
    Settings { path: PathBuf, message: String },

    /// The platform has no config or data directory for sitedesk files.
    #[error("No platform directory available for sitedesk files")]
    NoPlatformDirectory,

    /// Invalid value in settings or input.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StoreError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
