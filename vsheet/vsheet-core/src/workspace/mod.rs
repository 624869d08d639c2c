//! Spreadsheet operations that keep the recent pointer in step with the
//! document store.
//!
//! Handlers call into a [`Workspace`] rather than the two stores directly so
//! that the side effects on the pointer (set on create and open, repaired
//! on delete, self-healing on resolve) live in one place.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::recent::RecentPointerStore;
use crate::sheet::{DocumentStore, Spreadsheet, SpreadsheetSummary, SpreadsheetUpdate, DEFAULT_NAME};
use crate::storage::{FsBlobStorage, InMemoryBlobStorage};
use crate::timestamp::Timestamp;


/// Name of the spreadsheet created when the editor starts on an empty store.
pub const FIRST_SHEET_NAME: &str = "My First Spreadsheet";

/// Subdirectory of the data directory holding one file per spreadsheet.
pub const FILES_DIR: &str = "files";

#[derive(Clone)]
pub struct Workspace {
    documents: DocumentStore,
    recent: RecentPointerStore,
}

impl Workspace {
    pub fn new(documents: DocumentStore, recent: RecentPointerStore) -> Self {
        Self { documents, recent }
    }

    /// Open the on-disk layout under `data_dir`: spreadsheets in
    /// `files/<id>.json`, the pointer in `metadata.json`. Missing
    /// directories are created.
    pub fn open_dir(data_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let data_dir = data_dir.as_ref();
        let files = FsBlobStorage::new(Self::files_dir(data_dir))?;
        let meta = FsBlobStorage::new(data_dir)?;
        Ok(Self::new(
            DocumentStore::new(Arc::new(files)),
            RecentPointerStore::new(Arc::new(meta)),
        ))
    }

    /// Workspace backed entirely by memory.
    pub fn in_memory() -> Self {
        Self::new(
            DocumentStore::new(Arc::new(InMemoryBlobStorage::new())),
            RecentPointerStore::new(Arc::new(InMemoryBlobStorage::new())),
        )
    }

    pub fn files_dir(data_dir: &Path) -> PathBuf {
        data_dir.join(FILES_DIR)
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub fn recent(&self) -> &RecentPointerStore {
        &self.recent
    }

    pub async fn list(&self) -> StoreResult<Vec<SpreadsheetSummary>> {
        self.documents.list().await
    }

    /// Create a spreadsheet and make it the recent one.
    pub async fn create(&self, name: Option<String>) -> StoreResult<Spreadsheet> {
        let name = name.unwrap_or_else(|| DEFAULT_NAME.to_string());
        let sheet = self.documents.create(name).await?;
        self.recent.set(&sheet.id).await?;
        Ok(sheet)
    }

    /// Load a spreadsheet and make it the recent one.
    pub async fn open(&self, id: &str) -> StoreResult<Spreadsheet> {
        let sheet = self.documents.get(id).await?;
        self.recent.set(id).await?;
        Ok(sheet)
    }

    /// Merge `update` into a spreadsheet. The recent pointer is untouched.
    pub async fn update(&self, id: &str, update: SpreadsheetUpdate) -> StoreResult<Timestamp> {
        self.documents.update(id, update).await
    }

    /// Delete a spreadsheet. If it was the recent one, the pointer moves to
    /// the most recently modified survivor, or is cleared when none remain.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        if !self.documents.exists(id).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let recent_id = self.recent.get_id().await?;

        self.documents.delete(id).await?;

        if recent_id.as_deref() == Some(id) {
            match self.documents.list().await?.first() {
                Some(next) => {
                    debug!(deleted = %id, next = %next.id, "moving recent pointer");
                    self.recent.set(&next.id).await?;
                }
                None => {
                    debug!(deleted = %id, "last spreadsheet deleted, clearing recent pointer");
                    self.recent.clear().await?;
                }
            }
        }
        Ok(())
    }

    /// Id of the spreadsheet the editor should open.
    ///
    /// A pointer naming an existing spreadsheet is returned as is, without
    /// refreshing its access time. Otherwise the pointer is repaired to the
    /// most recently modified spreadsheet, and on an empty store a first
    /// spreadsheet is created.
    pub async fn resolve_recent(&self) -> StoreResult<String> {
        if let Some(id) = self.recent.get_id().await? {
            if self.documents.exists(&id).await? {
                return Ok(id);
            }
            debug!(id = %id, "recent pointer is stale");
        }

        if let Some(newest) = self.documents.list().await?.into_iter().next() {
            self.recent.set(&newest.id).await?;
            return Ok(newest.id);
        }

        let sheet = self.documents.create(FIRST_SHEET_NAME).await?;
        self.recent.set(&sheet.id).await?;
        info!(id = %sheet.id, "bootstrapped first spreadsheet");
        Ok(sheet.id)
    }
}
