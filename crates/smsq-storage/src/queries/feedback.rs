// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feedback persistence.

use rusqlite::params;
use smsq_core::SmsqError;
use smsq_core::types::ChatId;

use crate::database::{Database, map_tr_err};

/// Inserts a feedback row. Returns its id.
pub async fn insert_feedback(db: &Database, chat_id: ChatId, text: &str) -> Result<i64, SmsqError> {
    let text = text.to_string();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO feedback (chat_id, text) VALUES (?1, ?2)",
                params![chat_id.0, text],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}
