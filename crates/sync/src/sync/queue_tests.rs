// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the durable queue store.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::queue::*;
use super::test_helpers::make_item;
use ft_core::{Action, EntityType};
use tempfile::tempdir;

#[test]
fn test_load_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let store = FileQueueStore::in_dir(dir.path()).unwrap();
    assert!(store.load().is_empty());
}

#[test]
fn test_save_and_load_preserves_order() {
    let dir = tempdir().unwrap();
    let store = FileQueueStore::in_dir(dir.path()).unwrap();

    let items = vec![
        make_item("q-1", Action::Create, EntityType::Transaction, 1000),
        make_item("q-2", Action::Update, EntityType::Card, 2000),
        make_item("q-3", Action::Delete, EntityType::Card, 3000),
    ];
    store.save(&items).unwrap();

    let loaded = store.load();
    assert_eq!(loaded, items);
}

#[test]
fn test_save_overwrites_previous_state() {
    let dir = tempdir().unwrap();
    let store = FileQueueStore::in_dir(dir.path()).unwrap();

    store
        .save(&[
            make_item("q-1", Action::Create, EntityType::Note, 1),
            make_item("q-2", Action::Create, EntityType::Note, 2),
        ])
        .unwrap();
    store
        .save(&[make_item("q-2", Action::Create, EntityType::Note, 2)])
        .unwrap();

    let loaded = store.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "q-2");
}

#[test]
fn test_persisted_format_is_json_array() {
    let dir = tempdir().unwrap();
    let store = FileQueueStore::in_dir(dir.path()).unwrap();
    store
        .save(&[make_item("q-1", Action::Create, EntityType::Budget, 42)])
        .unwrap();

    let raw = std::fs::read_to_string(dir.path().join(QUEUE_FILE_NAME)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 1);
    assert_eq!(array[0]["type"], "budget");
    assert_eq!(array[0]["timestamp"], 42);
    assert_eq!(array[0]["retryCount"], 0);
}

#[test]
fn test_corrupt_file_falls_back_to_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(QUEUE_FILE_NAME);
    std::fs::write(&path, r#"[{"id":"q-1","action":"create","#).unwrap();

    let store = FileQueueStore::open(&path).unwrap();
    assert!(store.load().is_empty());
}

#[test]
fn test_wrong_shape_falls_back_to_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(QUEUE_FILE_NAME);
    std::fs::write(&path, r#"{"not":"an array"}"#).unwrap();

    let store = FileQueueStore::open(&path).unwrap();
    assert!(store.load().is_empty());
}

#[test]
fn test_blank_file_is_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(QUEUE_FILE_NAME);
    std::fs::write(&path, "  \n").unwrap();

    let store = FileQueueStore::open(&path).unwrap();
    assert!(store.load().is_empty());
}

#[test]
fn test_save_after_corruption_recovers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(QUEUE_FILE_NAME);
    std::fs::write(&path, "garbage").unwrap();

    let store = FileQueueStore::open(&path).unwrap();
    let mut items = store.load();
    items.push(make_item("q-1", Action::Create, EntityType::Payment, 1));
    store.save(&items).unwrap();

    assert_eq!(store.load().len(), 1);
}

#[test]
fn test_save_leaves_no_temp_file() {
    let dir = tempdir().unwrap();
    let store = FileQueueStore::in_dir(dir.path()).unwrap();
    store
        .save(&[make_item("q-1", Action::Create, EntityType::Note, 1)])
        .unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec![QUEUE_FILE_NAME.to_string()]);
}

#[test]
fn test_open_creates_parent_dirs() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("state").join(QUEUE_FILE_NAME);
    let store = FileQueueStore::open(&path).unwrap();
    store.save(&[]).unwrap();
    assert!(path.exists());
}

#[test]
fn test_persistence_across_instances() {
    let dir = tempdir().unwrap();

    {
        let store = FileQueueStore::in_dir(dir.path()).unwrap();
        store
            .save(&[
                make_item("q-1", Action::Create, EntityType::Transaction, 1),
                make_item("q-2", Action::Delete, EntityType::Transaction, 2),
            ])
            .unwrap();
    }

    {
        let store = FileQueueStore::in_dir(dir.path()).unwrap();
        let ids: Vec<String> = store.load().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["q-1", "q-2"]);
    }
}

#[test]
fn test_memory_store_records_saves() {
    let store = MemoryQueueStore::new();
    assert!(store.load().is_empty());

    store
        .save(&[make_item("q-1", Action::Create, EntityType::Note, 1)])
        .unwrap();
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.saved().len(), 1);

    store.set_fail_saves(true);
    assert!(store.save(&[]).is_err());
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.saved().len(), 1);
}
