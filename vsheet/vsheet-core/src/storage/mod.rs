//! Key/value persistence backends.
//!
//! Every record the service keeps is a small JSON blob stored under a string
//! key. [`BlobStorage`] hides where the blobs live so the document and
//! recent-pointer stores can run against a directory on disk or an in-memory
//! map without changes.

use crate::error::StoreResult;
use async_trait::async_trait;

pub mod filesystem;
pub mod memory;


pub use filesystem::FsBlobStorage;
pub use memory::InMemoryBlobStorage;

const MAX_KEY_LEN: usize = 128;

/// Trait for blob storage backends
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store `data` under `key`, replacing anything already there.
    async fn put(&self, key: &str, data: &[u8]) -> StoreResult<()>;
    /// Fetch the blob stored under `key`, `None` when absent.
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;
    /// Remove the blob under `key`. Returns `false` if nothing was stored.
    async fn delete(&self, key: &str) -> StoreResult<bool>;
    async fn exists(&self, key: &str) -> StoreResult<bool>;
    /// All stored keys in ascending order.
    async fn list(&self) -> StoreResult<Vec<String>>;
}

/// Keys double as file names, so only ASCII alphanumerics, `-` and `_` are
/// accepted. Lookups with any other key behave as if nothing is stored.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
