// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store behavior through the trait object, against a file database.

use std::sync::Arc;

use smsq_config::model::StorageConfig;
use smsq_core::RecordStore;
use smsq_core::types::ChatId;
use smsq_storage::SqliteStore;

async fn open_store(dir: &tempfile::TempDir) -> Arc<dyn RecordStore> {
    let path = dir.path().join("smsq.db");
    let store = SqliteStore::new(StorageConfig {
        database_path: path.to_string_lossy().into_owned(),
        wal_mode: true,
    });
    store.initialize().await.unwrap();
    Arc::new(store)
}

#[tokio::test]
async fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = open_store(&dir).await;
        store.subscribe(ChatId(10), "persist", 7).await.unwrap();
        store.apply_rollover(86_400).await.unwrap();
        store.close().await.unwrap();
    }

    let store = open_store(&dir).await;
    let binding = store.binding_for_key("persist").await.unwrap().unwrap();
    assert_eq!(binding.chat_id, ChatId(10));
    assert_eq!(binding.daily_limit, 7);
    assert_eq!(store.stored_midnight().await.unwrap(), 86_400);
}

#[tokio::test]
async fn rollover_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;
    store.subscribe(ChatId(1), "k", 10).await.unwrap();
    store.record_delivery(ChatId(1)).await.unwrap();

    store.apply_rollover(1000).await.unwrap();
    let after_first = store.account(ChatId(1)).await.unwrap();
    store.apply_rollover(1000).await.unwrap();
    let after_second = store.account(ChatId(1)).await.unwrap();

    assert_eq!(after_first, after_second);
    assert_eq!(store.stored_midnight().await.unwrap(), 1000);
}

#[tokio::test]
async fn one_active_owner_per_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;
    for chat in 1..=3 {
        store.subscribe(ChatId(chat), "shared", 10).await.unwrap();
    }
    assert_eq!(store.active_chats().await.unwrap(), vec![ChatId(3)]);
    assert_eq!(store.stats().await.unwrap().users, 1);
}

#[tokio::test]
async fn feedback_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;
    store.insert_feedback(ChatId(5), "works well").await.unwrap();
}
