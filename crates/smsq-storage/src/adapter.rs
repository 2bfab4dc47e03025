// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`RecordStore`] trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use smsq_config::model::StorageConfig;
use smsq_core::types::{ChatId, KeyBinding, SubscriberStats, UserAccount};
use smsq_core::{AdapterType, HealthStatus, PluginAdapter, RecordStore, SmsqError};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed record store.
///
/// The database is opened lazily by [`RecordStore::initialize`]; every other
/// call fails with a storage error until then.
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wraps an already opened database, e.g. an in-memory one in tests.
    pub fn with_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::from(db),
        }
    }

    fn db(&self) -> Result<&Database, SmsqError> {
        self.db.get().ok_or_else(|| SmsqError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(&self) -> Result<(), SmsqError> {
        if let Some(db) = self.db.get() {
            if self.config.wal_mode {
                db.connection()
                    .call(|conn| -> Result<(), rusqlite::Error> {
                        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                    })
                    .await
                    .map_err(map_tr_err)?;
                debug!("WAL checkpoint complete");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, SmsqError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> { conn.execute_batch("SELECT 1;") })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SmsqError> {
        self.checkpoint().await
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn initialize(&self) -> Result<(), SmsqError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| SmsqError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite record store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), SmsqError> {
        self.db()?;
        self.checkpoint().await
    }

    async fn binding_for_key(&self, key: &str) -> Result<Option<KeyBinding>, SmsqError> {
        queries::users::binding_for_key(self.db()?, key).await
    }

    async fn key_for_chat(&self, chat_id: ChatId) -> Result<Option<String>, SmsqError> {
        queries::users::key_for_chat(self.db()?, chat_id).await
    }

    async fn account(&self, chat_id: ChatId) -> Result<Option<UserAccount>, SmsqError> {
        queries::users::account(self.db()?, chat_id).await
    }

    async fn user_exists(&self, chat_id: ChatId) -> Result<bool, SmsqError> {
        queries::users::user_exists(self.db()?, chat_id).await
    }

    async fn subscribe(
        &self,
        chat_id: ChatId,
        key: &str,
        daily_limit: i64,
    ) -> Result<(), SmsqError> {
        queries::users::subscribe(self.db()?, chat_id, key, daily_limit).await
    }

    async fn unsubscribe(&self, chat_id: ChatId) -> Result<(), SmsqError> {
        queries::users::unsubscribe(self.db()?, chat_id).await
    }

    async fn increment_received_today(&self, chat_id: ChatId) -> Result<i64, SmsqError> {
        queries::users::increment_received_today(self.db()?, chat_id).await
    }

    async fn delivered_today(&self, chat_id: ChatId) -> Result<i64, SmsqError> {
        queries::users::delivered_today(self.db()?, chat_id).await
    }

    async fn increment_delivered_today(&self, chat_id: ChatId) -> Result<(), SmsqError> {
        queries::users::increment_delivered_today(self.db()?, chat_id).await
    }

    async fn record_delivery(&self, chat_id: ChatId) -> Result<(), SmsqError> {
        queries::users::record_delivery(self.db()?, chat_id).await
    }

    async fn active_chats(&self) -> Result<Vec<ChatId>, SmsqError> {
        queries::users::active_chats(self.db()?).await
    }

    async fn stats(&self) -> Result<SubscriberStats, SmsqError> {
        queries::users::stats(self.db()?).await
    }

    async fn set_daily_limit(&self, chat_id: ChatId, limit: i64) -> Result<bool, SmsqError> {
        queries::users::set_daily_limit(self.db()?, chat_id, limit).await
    }

    async fn insert_feedback(&self, chat_id: ChatId, text: &str) -> Result<(), SmsqError> {
        let id = queries::feedback::insert_feedback(self.db()?, chat_id, text).await?;
        debug!(chat_id = chat_id.0, id, "feedback stored");
        Ok(())
    }

    async fn stored_midnight(&self) -> Result<i64, SmsqError> {
        queries::midnight::stored_midnight(self.db()?).await
    }

    async fn apply_rollover(&self, midnight: i64) -> Result<(), SmsqError> {
        queries::midnight::apply_rollover(self.db()?, midnight).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_store_implements_plugin_adapter() {
        let store = SqliteStore::new(make_config("unused.db"));
        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.version(), semver::Version::new(0, 1, 0));
        assert_eq!(store.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn calls_before_initialize_fail() {
        let store = SqliteStore::new(make_config("unused.db"));
        let err = store.user_exists(ChatId(1)).await.unwrap_err();
        assert!(err.to_string().contains("not initialized"));
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn double_initialize_fails() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err());
    }

    #[tokio::test]
    async fn close_checkpoints_wal() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("close.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();
        store.subscribe(ChatId(1), "k", 10).await.unwrap();
        store.close().await.unwrap();
        store.shutdown().await.unwrap();
    }
}
