use super::*;
use crate::storage::{FsBlobStorage, InMemoryBlobStorage};
use chrono::Duration;
use tempfile::TempDir;

fn memory_store() -> DocumentStore {
    DocumentStore::new(Arc::new(InMemoryBlobStorage::new()))
}

async fn backdate(store: &DocumentStore, id: &str, minutes: i64) {
    let mut sheet = store.get(id).await.unwrap();
    sheet.modified = sheet.modified - Duration::minutes(minutes);
    sheet.created = sheet.modified;
    store.write(&sheet).await.unwrap();
}

#[tokio::test]
async fn create_uses_defaults() {
    let store = memory_store();
    let sheet = store.create(DEFAULT_NAME).await.unwrap();

    assert_eq!(sheet.name, "Untitled Spreadsheet");
    assert_eq!(sheet.created, sheet.modified);
    assert!(Uuid::parse_str(&sheet.id).is_ok());
    assert_eq!(sheet.data["cells"], json!({}));
    assert_eq!(sheet.data["columnWidths"].as_array().unwrap().len(), 26);
    assert!(sheet.data["columnWidths"]
        .as_array()
        .unwrap()
        .iter()
        .all(|w| w == 94));
    assert_eq!(sheet.data["rowHeights"].as_array().unwrap().len(), 100);
    assert!(sheet.data["rowHeights"]
        .as_array()
        .unwrap()
        .iter()
        .all(|h| h == 20));
    assert_eq!(sheet.data["metadata"]["lastActiveCell"], "A1");
    assert_eq!(sheet.data["metadata"]["selections"], json!([]));

    let loaded = store.get(&sheet.id).await.unwrap();
    assert_eq!(loaded, sheet);
}

#[tokio::test]
async fn sequential_creates_get_distinct_ids() {
    let store = memory_store();
    let a = store.create("a").await.unwrap();
    let b = store.create("b").await.unwrap();
    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn get_distinguishes_missing_and_corrupt() {
    let backend = Arc::new(InMemoryBlobStorage::new());
    let store = DocumentStore::new(backend.clone());

    assert!(matches!(
        store.get("missing").await,
        Err(StoreError::NotFound(id)) if id == "missing"
    ));

    backend.put("broken", b"{ not json").await.unwrap();
    assert!(matches!(
        store.get("broken").await,
        Err(StoreError::Corrupt { .. })
    ));

    backend
        .put("shapeless", br#"{"id": "shapeless", "name": 3}"#)
        .await
        .unwrap();
    assert!(matches!(
        store.get("shapeless").await,
        Err(StoreError::Corrupt { .. })
    ));
}

#[tokio::test]
async fn list_orders_newest_first_and_skips_bad_records() {
    let backend = Arc::new(InMemoryBlobStorage::new());
    let store = DocumentStore::new(backend.clone());

    let old = store.create("old").await.unwrap();
    let mid = store.create("mid").await.unwrap();
    let new = store.create("new").await.unwrap();
    backdate(&store, &old.id, 20).await;
    backdate(&store, &mid.id, 10).await;

    backend.put("garbage", b"[1, 2").await.unwrap();
    backend
        .put("partial", br#"{"id": "partial", "name": "no modified"}"#)
        .await
        .unwrap();
    backend
        .put(
            "misfiled",
            br#"{"id": "elsewhere", "name": "x", "modified": "2024-01-01T00:00:00Z"}"#,
        )
        .await
        .unwrap();

    let listed = store.list().await.unwrap();
    let ids: Vec<_> = listed.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec![new.id.as_str(), mid.id.as_str(), old.id.as_str()]);
    assert_eq!(listed[0].name, "new");
    assert!(listed.windows(2).all(|w| w[0].modified >= w[1].modified));
}

#[tokio::test]
async fn list_breaks_ties_by_id() {
    let store = memory_store();
    let a = store.create("a").await.unwrap();
    let mut b = store.create("b").await.unwrap();
    b.modified = a.modified;
    b.created = a.created;
    store.write(&b).await.unwrap();

    let listed = store.list().await.unwrap();
    let mut expected = vec![a.id.clone(), b.id.clone()];
    expected.sort();
    let ids: Vec<_> = listed.into_iter().map(|s| s.id).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn rename_leaves_data_bytes_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let backend = Arc::new(FsBlobStorage::new(temp_dir.path()).unwrap());
    let store = DocumentStore::new(backend.clone());

    let sheet = store.create("Draft").await.unwrap();
    let data = json!({
        "cells": {"B2": {"value": "=A1*2"}, "A1": {"value": "21"}},
        "columnWidths": [120, 94],
        "rowHeights": [20],
        "metadata": {"lastActiveCell": "B2", "selections": [{"start": "A1", "end": "B2"}]}
    });
    store
        .update(
            &sheet.id,
            SpreadsheetUpdate {
                data: Some(data.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let before = store.get(&sheet.id).await.unwrap();
    let before_bytes = serde_json::to_vec_pretty(&before.data).unwrap();

    let modified = store
        .update(
            &sheet.id,
            SpreadsheetUpdate {
                name: Some("Budget".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let after = store.get(&sheet.id).await.unwrap();
    assert_eq!(after.name, "Budget");
    assert_eq!(after.modified, modified);
    assert!(after.modified >= before.modified);
    assert_eq!(after.created, sheet.created);
    assert_eq!(after.data, data);
    assert_eq!(serde_json::to_vec_pretty(&after.data).unwrap(), before_bytes);

    // key order of the editor payload survives the round trip
    let raw = std::fs::read_to_string(temp_dir.path().join(format!("{}.json", sheet.id))).unwrap();
    assert!(raw.find("\"B2\"").unwrap() < raw.find("\"A1\"").unwrap());
}

#[tokio::test]
async fn update_keeps_unknown_top_level_keys() {
    let backend = Arc::new(InMemoryBlobStorage::new());
    let store = DocumentStore::new(backend.clone());
    let record = json!({
        "id": "shared",
        "name": "Shared",
        "created": "2024-01-15T10:30:00.123456Z",
        "modified": "2024-01-15T10:30:00.123456Z",
        "data": {"cells": {}},
        "owner": "ops",
        "revision": 4
    });
    backend
        .put("shared", record.to_string().as_bytes())
        .await
        .unwrap();

    store
        .update(
            "shared",
            SpreadsheetUpdate {
                name: Some("Renamed".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let stored: Value =
        serde_json::from_slice(&backend.get("shared").await.unwrap().unwrap()).unwrap();
    assert_eq!(stored["name"], "Renamed");
    assert_eq!(stored["owner"], "ops");
    assert_eq!(stored["revision"], 4);
    assert_eq!(stored["data"], json!({"cells": {}}));
}

#[tokio::test]
async fn empty_update_only_touches_modified() {
    let store = memory_store();
    let sheet = store.create("Keep").await.unwrap();
    backdate(&store, &sheet.id, 5).await;
    let before = store.get(&sheet.id).await.unwrap();

    let update: SpreadsheetUpdate = serde_json::from_str("{}").unwrap();
    assert!(update.is_empty());
    let modified = store.update(&sheet.id, update).await.unwrap();

    let after = store.get(&sheet.id).await.unwrap();
    assert!(modified > before.modified);
    assert_eq!(after.name, before.name);
    assert_eq!(after.created, before.created);
    assert_eq!(after.data, before.data);
}

#[tokio::test]
async fn update_payload_parsing() {
    let update: SpreadsheetUpdate =
        serde_json::from_value(json!({"data": null, "extra": true})).unwrap();
    assert_eq!(update.name, None);
    assert_eq!(update.data, Some(Value::Null));

    let update: SpreadsheetUpdate = serde_json::from_value(json!({"name": null})).unwrap();
    assert!(update.is_empty());

    assert!(serde_json::from_value::<SpreadsheetUpdate>(json!({"name": 7})).is_err());
}

#[tokio::test]
async fn update_and_delete_missing_are_not_found() {
    let store = memory_store();
    assert!(store
        .update("nope", SpreadsheetUpdate::default())
        .await
        .unwrap_err()
        .is_not_found());
    assert!(store.delete("nope").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn delete_removes_document() {
    let store = memory_store();
    let sheet = store.create("Gone").await.unwrap();
    store.delete(&sheet.id).await.unwrap();
    assert!(!store.exists(&sheet.id).await.unwrap());
    assert!(store.get(&sheet.id).await.unwrap_err().is_not_found());
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn persisted_file_is_pretty_printed() {
    let temp_dir = TempDir::new().unwrap();
    let store = DocumentStore::new(Arc::new(FsBlobStorage::new(temp_dir.path()).unwrap()));
    let sheet = store.create("Pretty").await.unwrap();

    let raw = std::fs::read_to_string(temp_dir.path().join(format!("{}.json", sheet.id))).unwrap();
    assert!(raw.starts_with("{\n  \"id\": "));
    let value: Value = serde_json::from_str(&raw).unwrap();
    let created = value["created"].as_str().unwrap();
    assert!(created.ends_with('Z'));
    assert_eq!(created, value["modified"].as_str().unwrap());
}
