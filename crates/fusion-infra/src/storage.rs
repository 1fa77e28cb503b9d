//! File-backed [`StateStorage`]: one `{key}.json` file per storage key.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use fusion_core::persistence::{StateStorage, StorageKey};
use fusion_types::error::StorageError;

/// Stores each key as `{dir}/state/{key}.json`. On unix the files are
/// created owner-only (0600).
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join("state"),
        }
    }

    pub fn path_for(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StorageError {
    StorageError::Io(format!("{}: {err}", path.display()))
}

/// Create `path` fresh with owner-only permissions and write `bytes`.
async fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    // A leftover temp file would keep its old mode.
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

impl StateStorage for JsonFileStorage {
    async fn read(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&path, err)),
        }
    }

    async fn write(&self, key: StorageKey, value: String) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        // Write-then-rename: readers never observe a partial value.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        write_private(&tmp, value.as_bytes())
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))
    }

    async fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&path, err)),
        }
    }
}
