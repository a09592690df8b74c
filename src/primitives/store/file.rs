use crate::error::ContextError;
use crate::primitives::store::KeyValueStore;
use std::path::{Path, PathBuf};

/// One UTF-8 file per key under a fixed directory.
///
/// Keys are used verbatim as file names, so they must be valid file names.
/// There is no locking: concurrent writes to one key race and the last one
/// to finish wins.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open the store, creating its directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ContextError> {
        let dir = dir.into();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                ContextError::ConfigError(format!(
                    "Failed to create store directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`, as a path join of the store directory and `key`.
    ///
    /// Leading `/` characters are trimmed first so an absolute-looking key
    /// stays inside the directory. Other segments, `..` included, are joined
    /// verbatim.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key.trim_start_matches('/'))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        tracing::debug!("get value for {}", key);
        let path = self.entry_path(key);
        if !path.exists() {
            return None;
        }
        match std::fs::read_to_string(&path) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Failed to read store entry {}: {}", path.display(), e);
                None
            }
        }
    }

    fn put(&self, value: &str, key: &str) -> bool {
        tracing::debug!("put value to {}", key);
        let path = self.entry_path(key);
        match std::fs::write(&path, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to write store entry {}: {}", path.display(), e);
                false
            }
        }
    }
}
