//! Spreadsheet documents and the store persisting them.
//!
//! Each spreadsheet is a single pretty-printed JSON record keyed by its id.
//! The `data` payload belongs to the editor and is kept verbatim.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::storage::BlobStorage;
use crate::timestamp::{self, Timestamp};

#[cfg(test)]
mod tests;

pub const DEFAULT_NAME: &str = "Untitled Spreadsheet";
pub const DEFAULT_COLUMN_COUNT: usize = 26;
pub const DEFAULT_COLUMN_WIDTH: u32 = 94;
pub const DEFAULT_ROW_COUNT: usize = 100;
pub const DEFAULT_ROW_HEIGHT: u32 = 20;
pub const DEFAULT_ACTIVE_CELL: &str = "A1";

/// A persisted spreadsheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spreadsheet {
    pub id: String,
    pub name: String,
    #[serde(with = "crate::timestamp")]
    pub created: Timestamp,
    #[serde(with = "crate::timestamp")]
    pub modified: Timestamp,
    pub data: Value,
    /// Top-level keys written by other clients, carried through updates.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Listing entry: the fields needed to pick a spreadsheet without loading
/// its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadsheetSummary {
    pub id: String,
    pub name: String,
    #[serde(with = "crate::timestamp")]
    pub modified: Timestamp,
}

/// Merge update. Absent fields are left untouched; `data` may be set to any
/// value including `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SpreadsheetUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub data: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl SpreadsheetUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.data.is_none()
    }
}

/// Payload given to every new spreadsheet.
pub fn default_data() -> Value {
    json!({
        "cells": {},
        "columnWidths": vec![DEFAULT_COLUMN_WIDTH; DEFAULT_COLUMN_COUNT],
        "rowHeights": vec![DEFAULT_ROW_HEIGHT; DEFAULT_ROW_COUNT],
        "metadata": {
            "lastActiveCell": DEFAULT_ACTIVE_CELL,
            "selections": []
        }
    })
}

/// Store for spreadsheets on top of a [`BlobStorage`] backend.
#[derive(Clone)]
pub struct DocumentStore {
    backend: Arc<dyn BlobStorage>,
}

impl DocumentStore {
    pub fn new(backend: Arc<dyn BlobStorage>) -> Self {
        Self { backend }
    }

    /// Summaries of every readable spreadsheet, most recently modified
    /// first. Ties are ordered by id. Records that fail to parse, or whose
    /// id does not match their key, are skipped.
    pub async fn list(&self) -> StoreResult<Vec<SpreadsheetSummary>> {
        let mut sheets = Vec::new();

        for key in self.backend.list().await? {
            let Some(bytes) = self.backend.get(&key).await? else {
                // removed between listing and reading
                continue;
            };
            match serde_json::from_slice::<SpreadsheetSummary>(&bytes) {
                Ok(summary) if summary.id == key => sheets.push(summary),
                Ok(summary) => {
                    warn!(key = %key, id = %summary.id, "skipping spreadsheet stored under a foreign key");
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "skipping unreadable spreadsheet");
                }
            }
        }

        sheets.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(sheets)
    }

    /// Create and persist a spreadsheet with the default payload.
    pub async fn create(&self, name: impl Into<String>) -> StoreResult<Spreadsheet> {
        let id = self.fresh_id().await?;
        let now = timestamp::now();
        let sheet = Spreadsheet {
            id,
            name: name.into(),
            created: now,
            modified: now,
            data: default_data(),
            extra: Map::new(),
        };
        self.write(&sheet).await?;
        info!(id = %sheet.id, name = %sheet.name, "created spreadsheet");
        Ok(sheet)
    }

    pub async fn get(&self, id: &str) -> StoreResult<Spreadsheet> {
        let bytes = self
            .backend
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            id: id.to_string(),
            source,
        })
    }

    pub async fn exists(&self, id: &str) -> StoreResult<bool> {
        self.backend.exists(id).await
    }

    /// Apply `update` and bump `modified`. Returns the new `modified`.
    pub async fn update(&self, id: &str, update: SpreadsheetUpdate) -> StoreResult<Timestamp> {
        let mut sheet = self.get(id).await?;

        if let Some(name) = update.name {
            sheet.name = name;
        }
        if let Some(data) = update.data {
            sheet.data = data;
        }
        // `modified` is monotonic and never precedes `created`
        sheet.modified = timestamp::now().max(sheet.modified).max(sheet.created);

        self.write(&sheet).await?;
        debug!(id = %id, modified = %timestamp::format(&sheet.modified), "updated spreadsheet");
        Ok(sheet.modified)
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        if !self.backend.delete(id).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }
        info!(id = %id, "deleted spreadsheet");
        Ok(())
    }

    async fn fresh_id(&self) -> StoreResult<String> {
        loop {
            let id = Uuid::new_v4().to_string();
            if !self.backend.exists(&id).await? {
                return Ok(id);
            }
        }
    }

    async fn write(&self, sheet: &Spreadsheet) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(sheet).map_err(StoreError::Serialize)?;
        self.backend.put(&sheet.id, &bytes).await
    }
}
