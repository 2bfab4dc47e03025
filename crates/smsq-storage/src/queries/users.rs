// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscriber account queries.

use rusqlite::{OptionalExtension, params};
use smsq_core::SmsqError;
use smsq_core::types::{ChatId, KeyBinding, SubscriberStats, UserAccount};

use crate::database::{Database, map_tr_err};

/// Active owner of `key`.
pub async fn binding_for_key(db: &Database, key: &str) -> Result<Option<KeyBinding>, SmsqError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<KeyBinding>, rusqlite::Error> {
            conn.query_row(
                "SELECT chat_id, daily_limit FROM users WHERE key = ?1 AND deleted = 0",
                params![key],
                |row| {
                    Ok(KeyBinding {
                        chat_id: ChatId(row.get(0)?),
                        daily_limit: row.get(1)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Key held by the active account of `chat_id`.
pub async fn key_for_chat(db: &Database, chat_id: ChatId) -> Result<Option<String>, SmsqError> {
    db.connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            conn.query_row(
                "SELECT key FROM users WHERE chat_id = ?1 AND deleted = 0",
                params![chat_id.0],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Full account row, deleted or not.
pub async fn account(db: &Database, chat_id: ChatId) -> Result<Option<UserAccount>, SmsqError> {
    db.connection()
        .call(move |conn| -> Result<Option<UserAccount>, rusqlite::Error> {
            conn.query_row(
                "SELECT chat_id, key, daily_limit, delivered, delivered_today,
                        received_today, deleted
                 FROM users WHERE chat_id = ?1",
                params![chat_id.0],
                |row| {
                    Ok(UserAccount {
                        chat_id: ChatId(row.get(0)?),
                        key: row.get(1)?,
                        daily_limit: row.get(2)?,
                        delivered_total: row.get(3)?,
                        delivered_today: row.get(4)?,
                        received_today: row.get(5)?,
                        deleted: row.get(6)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn user_exists(db: &Database, chat_id: ChatId) -> Result<bool, SmsqError> {
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE chat_id = ?1 AND deleted = 0)",
                params![chat_id.0],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Binds `key` to `chat_id` in one transaction.
///
/// Other active holders of the key are soft-deleted first so the partial
/// unique index never sees two active owners.
pub async fn subscribe(
    db: &Database,
    chat_id: ChatId,
    key: &str,
    daily_limit: i64,
) -> Result<(), SmsqError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute(
                "UPDATE users SET deleted = 1 WHERE key = ?1 AND chat_id != ?2 AND deleted = 0",
                params![key, chat_id.0],
            )?;
            tx.execute(
                "INSERT INTO users (chat_id, key, daily_limit) VALUES (?1, ?2, ?3)
                 ON CONFLICT(chat_id) DO UPDATE SET key = excluded.key, deleted = 0",
                params![chat_id.0, key, daily_limit],
            )?;
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn unsubscribe(db: &Database, chat_id: ChatId) -> Result<(), SmsqError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE users SET deleted = 1 WHERE chat_id = ?1",
                params![chat_id.0],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Bumps `received_today` and returns the new value.
pub async fn increment_received_today(db: &Database, chat_id: ChatId) -> Result<i64, SmsqError> {
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "UPDATE users SET received_today = received_today + 1
                 WHERE chat_id = ?1 RETURNING received_today",
                params![chat_id.0],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delivered_today(db: &Database, chat_id: ChatId) -> Result<i64, SmsqError> {
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "SELECT delivered_today FROM users WHERE chat_id = ?1",
                params![chat_id.0],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn increment_delivered_today(db: &Database, chat_id: ChatId) -> Result<(), SmsqError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE users SET delivered_today = delivered_today + 1 WHERE chat_id = ?1",
                params![chat_id.0],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn record_delivery(db: &Database, chat_id: ChatId) -> Result<(), SmsqError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE users SET delivered = delivered + 1,
                                  delivered_today = delivered_today + 1
                 WHERE chat_id = ?1",
                params![chat_id.0],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn active_chats(db: &Database) -> Result<Vec<ChatId>, SmsqError> {
    db.connection()
        .call(|conn| -> Result<Vec<ChatId>, rusqlite::Error> {
            let mut stmt =
                conn.prepare("SELECT chat_id FROM users WHERE deleted = 0 ORDER BY chat_id")?;
            let rows = stmt.query_map([], |row| Ok(ChatId(row.get(0)?)))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// User counts cover active accounts; message sums cover every row.
pub async fn stats(db: &Database) -> Result<SubscriberStats, SmsqError> {
    db.connection()
        .call(|conn| -> Result<SubscriberStats, rusqlite::Error> {
            conn.query_row(
                "SELECT
                    COALESCE(SUM(deleted = 0), 0),
                    COALESCE(SUM(deleted = 0 AND delivered > 0), 0),
                    COALESCE(SUM(delivered), 0),
                    COALESCE(SUM(delivered_today), 0)
                 FROM users",
                [],
                |row| {
                    Ok(SubscriberStats {
                        users: row.get(0)?,
                        active_users: row.get(1)?,
                        delivered_total: row.get(2)?,
                        delivered_today: row.get(3)?,
                    })
                },
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Returns `false` when no row matched.
pub async fn set_daily_limit(db: &Database, chat_id: ChatId, limit: i64) -> Result<bool, SmsqError> {
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE users SET daily_limit = ?1 WHERE chat_id = ?2",
                params![limit, chat_id.0],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn subscribe_creates_active_binding() {
        let db = db().await;
        subscribe(&db, ChatId(1), "k1", 50).await.unwrap();

        let binding = binding_for_key(&db, "k1").await.unwrap().unwrap();
        assert_eq!(binding.chat_id, ChatId(1));
        assert_eq!(binding.daily_limit, 50);
        assert_eq!(key_for_chat(&db, ChatId(1)).await.unwrap().as_deref(), Some("k1"));
        assert!(user_exists(&db, ChatId(1)).await.unwrap());
    }

    #[tokio::test]
    async fn subscribe_moves_key_between_chats() {
        let db = db().await;
        subscribe(&db, ChatId(1), "k", 10).await.unwrap();
        subscribe(&db, ChatId(2), "k", 10).await.unwrap();

        let binding = binding_for_key(&db, "k").await.unwrap().unwrap();
        assert_eq!(binding.chat_id, ChatId(2));
        let old = account(&db, ChatId(1)).await.unwrap().unwrap();
        assert!(old.deleted);
        assert_eq!(old.key, "k");
        assert!(!user_exists(&db, ChatId(1)).await.unwrap());
    }

    #[tokio::test]
    async fn resubscribe_keeps_limit_and_counters() {
        let db = db().await;
        subscribe(&db, ChatId(1), "a", 10).await.unwrap();
        record_delivery(&db, ChatId(1)).await.unwrap();
        unsubscribe(&db, ChatId(1)).await.unwrap();
        assert_eq!(binding_for_key(&db, "a").await.unwrap(), None);

        subscribe(&db, ChatId(1), "b", 99).await.unwrap();
        let acc = account(&db, ChatId(1)).await.unwrap().unwrap();
        assert!(!acc.deleted);
        assert_eq!(acc.key, "b");
        assert_eq!(acc.daily_limit, 10);
        assert_eq!(acc.delivered_total, 1);
    }

    #[tokio::test]
    async fn counters_increment() {
        let db = db().await;
        subscribe(&db, ChatId(3), "c", 10).await.unwrap();
        assert_eq!(increment_received_today(&db, ChatId(3)).await.unwrap(), 1);
        assert_eq!(increment_received_today(&db, ChatId(3)).await.unwrap(), 2);

        record_delivery(&db, ChatId(3)).await.unwrap();
        increment_delivered_today(&db, ChatId(3)).await.unwrap();
        assert_eq!(delivered_today(&db, ChatId(3)).await.unwrap(), 2);

        let acc = account(&db, ChatId(3)).await.unwrap().unwrap();
        assert_eq!(acc.delivered_total, 1);
        assert_eq!(acc.received_today, 2);
    }

    #[tokio::test]
    async fn stats_count_active_users_and_all_messages() {
        let db = db().await;
        subscribe(&db, ChatId(1), "a", 10).await.unwrap();
        subscribe(&db, ChatId(2), "b", 10).await.unwrap();
        subscribe(&db, ChatId(3), "c", 10).await.unwrap();
        record_delivery(&db, ChatId(1)).await.unwrap();
        record_delivery(&db, ChatId(3)).await.unwrap();
        record_delivery(&db, ChatId(3)).await.unwrap();
        unsubscribe(&db, ChatId(3)).await.unwrap();

        let stats = stats(&db).await.unwrap();
        assert_eq!(
            stats,
            SubscriberStats {
                users: 2,
                active_users: 1,
                delivered_total: 3,
                delivered_today: 3,
            }
        );
        assert_eq!(active_chats(&db).await.unwrap(), vec![ChatId(1), ChatId(2)]);
    }

    #[tokio::test]
    async fn stats_on_empty_table_are_zero() {
        let db = db().await;
        assert_eq!(stats(&db).await.unwrap(), SubscriberStats::default());
    }

    #[tokio::test]
    async fn set_daily_limit_reports_missing_rows() {
        let db = db().await;
        subscribe(&db, ChatId(1), "a", 10).await.unwrap();
        assert!(set_daily_limit(&db, ChatId(1), 500).await.unwrap());
        assert!(!set_daily_limit(&db, ChatId(404), 500).await.unwrap());
        assert_eq!(binding_for_key(&db, "a").await.unwrap().unwrap().daily_limit, 500);
    }
}
