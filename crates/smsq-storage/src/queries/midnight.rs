// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rollover clock queries.

use rusqlite::params;
use smsq_core::SmsqError;

use crate::database::{Database, map_tr_err};

/// Last processed day boundary. The row is created as zero on first read.
pub async fn stored_midnight(db: &Database) -> Result<i64, SmsqError> {
    db.connection()
        .call(|conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT OR IGNORE INTO midnight (id, unix_time) VALUES (1, 0)",
                [],
            )?;
            conn.query_row("SELECT unix_time FROM midnight WHERE id = 1", [], |row| {
                row.get(0)
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Stores `midnight` and zeroes every account's daily counters atomically.
pub async fn apply_rollover(db: &Database, midnight: i64) -> Result<(), SmsqError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO midnight (id, unix_time) VALUES (1, ?1)
                 ON CONFLICT(id) DO UPDATE SET unix_time = excluded.unix_time",
                params![midnight],
            )?;
            tx.execute(
                "UPDATE users SET delivered_today = 0, received_today = 0",
                [],
            )?;
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}
