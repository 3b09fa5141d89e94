//! Storage backends for the serialized preference blob.
//!
//! A backend is a flat key/value store of strings, the same contract a
//! browser's local storage offers. Encoding and versioning happen above it
//! in [`crate::persist`].

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// Durable key/value storage for preference blobs.
pub trait PreferenceStorage: Send + Sync {
    /// Read the blob stored under `key`.
    fn read(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replace the blob stored under `key`.
    fn write(&self, key: &str, blob: &str) -> StoreResult<()>;

    /// Delete the blob stored under `key`, if present.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// Process-local storage. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: DashMap<String, String>,
}

impl MemoryStorage {
    /// Create empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Check if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl PreferenceStorage for MemoryStorage {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.blobs.get(key).map(|blob| blob.value().clone()))
    }

    fn write(&self, key: &str, blob: &str) -> StoreResult<()> {
        self.blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.blobs.remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "MemoryStorage"
    }
}

/// One JSON file per key inside a directory.
///
/// Writes go to a temporary file in the same directory which then replaces
/// the target, so a reader never sees a half-written blob.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create file storage rooted at `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
            info!(dir = %dir.display(), "Created preference storage directory");
        }
        Ok(Self { dir })
    }

    /// Directory holding the blobs.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl PreferenceStorage for FileStorage {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No stored preferences found");
                Ok(None)
            }
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn write(&self, key: &str, blob: &str) -> StoreResult<()> {
        let path = self.path_for(key);
        let mut file = NamedTempFile::new_in(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        file.write_all(blob.as_bytes())
            .map_err(|e| StoreError::io(file.path(), e))?;
        file.persist(&path)
            .map_err(|e| StoreError::io(&path, e.error))?;

        debug!(path = %path.display(), bytes = blob.len(), "Wrote preference blob");
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn name(&self) -> &'static str {
        "FileStorage"
    }
}
