use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{is_valid_key, BlobStorage};
use crate::error::{StoreError, StoreResult};

/// Simple in-memory backend used for testing.
#[derive(Debug, Default)]
pub struct InMemoryBlobStorage {
    data: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStorage {
    async fn put(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        if !is_valid_key(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let mut store = self.data.lock().await;
        store.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let store = self.data.lock().await;
        Ok(store.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut store = self.data.lock().await;
        Ok(store.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let store = self.data.lock().await;
        Ok(store.contains_key(key))
    }

    async fn list(&self) -> StoreResult<Vec<String>> {
        let store = self.data.lock().await;
        Ok(store.keys().cloned().collect())
    }
}
