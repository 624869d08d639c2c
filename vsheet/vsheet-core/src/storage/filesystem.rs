use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{is_valid_key, BlobStorage};
use crate::error::{StoreError, StoreResult};

const EXTENSION: &str = "json";

/// Directory-backed storage writing one `<key>.json` file per blob.
#[derive(Debug, Clone)]
pub struct FsBlobStorage {
    dir: PathBuf,
}

impl FsBlobStorage {
    /// Create a backend rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory where blobs are persisted.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{EXTENSION}"))
    }
}

#[async_trait]
impl BlobStorage for FsBlobStorage {
    async fn put(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        if !is_valid_key(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        fs::write(self.path_for(key), data).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        if !is_valid_key(key) {
            return Ok(None);
        }
        match fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        if !is_valid_key(key) {
            return Ok(false);
        }
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        if !is_valid_key(key) {
            return Ok(false);
        }
        match fs::metadata(self.path_for(key)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some(EXTENSION) {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if is_valid_key(stem) {
                    keys.push(stem.to_string());
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}
