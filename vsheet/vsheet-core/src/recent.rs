//! The recent-file pointer: a single record naming the spreadsheet the
//! editor should reopen.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::storage::BlobStorage;
use crate::timestamp::{self, Timestamp};

/// Key the pointer is stored under.
pub const POINTER_KEY: &str = "metadata";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPointer {
    pub recent_file_id: String,
    #[serde(with = "crate::timestamp")]
    pub last_accessed: Timestamp,
}

/// Owner of the pointer record. The pointer may name a spreadsheet that no
/// longer exists; callers are expected to check.
#[derive(Clone)]
pub struct RecentPointerStore {
    backend: Arc<dyn BlobStorage>,
    key: String,
}

impl RecentPointerStore {
    pub fn new(backend: Arc<dyn BlobStorage>) -> Self {
        Self::with_key(backend, POINTER_KEY)
    }

    pub fn with_key(backend: Arc<dyn BlobStorage>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Point at `id`, stamping the access time.
    pub async fn set(&self, id: &str) -> StoreResult<RecentPointer> {
        let pointer = RecentPointer {
            recent_file_id: id.to_string(),
            last_accessed: timestamp::now(),
        };
        let bytes = serde_json::to_vec_pretty(&pointer).map_err(StoreError::Serialize)?;
        self.backend.put(&self.key, &bytes).await?;
        debug!(id = %id, "recent pointer updated");
        Ok(pointer)
    }

    /// The stored pointer. A record that does not parse counts as no pointer.
    pub async fn get(&self) -> StoreResult<Option<RecentPointer>> {
        let Some(bytes) = self.backend.get(&self.key).await? else {
            return Ok(None);
        };
        match serde_json::from_slice(&bytes) {
            Ok(pointer) => Ok(Some(pointer)),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable recent pointer");
                Ok(None)
            }
        }
    }

    pub async fn get_id(&self) -> StoreResult<Option<String>> {
        Ok(self
            .get()
            .await?
            .map(|pointer| pointer.recent_file_id)
            .filter(|id| !id.is_empty()))
    }

    /// Remove the pointer record entirely.
    pub async fn clear(&self) -> StoreResult<()> {
        if self.backend.delete(&self.key).await? {
            debug!("recent pointer cleared");
        }
        Ok(())
    }
}
