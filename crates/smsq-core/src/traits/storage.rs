// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store trait for subscriber persistence (SQLite, etc.).

use async_trait::async_trait;

use crate::error::SmsqError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatId, KeyBinding, SubscriberStats, UserAccount};

/// Point lookups and updates on subscriber accounts and the rollover clock.
///
/// Every call is atomic on its own. Callers never need cross-call
/// transactions because only the relay's single writer issues calls.
/// Lookups by key or chat skip soft-deleted accounts unless noted.
#[async_trait]
pub trait RecordStore: PluginAdapter {
    /// Opens the backend and applies pending migrations.
    async fn initialize(&self) -> Result<(), SmsqError>;

    /// Flushes pending writes and releases the backend.
    async fn close(&self) -> Result<(), SmsqError>;

    /// Returns the active owner of `key`, if any.
    async fn binding_for_key(&self, key: &str) -> Result<Option<KeyBinding>, SmsqError>;

    /// Returns the key of the active account of `chat_id`, if any.
    async fn key_for_chat(&self, chat_id: ChatId) -> Result<Option<String>, SmsqError>;

    /// Returns the account row for `chat_id`, including soft-deleted rows.
    async fn account(&self, chat_id: ChatId) -> Result<Option<UserAccount>, SmsqError>;

    /// Returns `true` if `chat_id` has an active account.
    async fn user_exists(&self, chat_id: ChatId) -> Result<bool, SmsqError>;

    /// Binds `key` to `chat_id`.
    ///
    /// Soft-deletes any other active account holding the same key, then
    /// creates the account or reactivates it with the new key. An existing
    /// row keeps its daily limit and counters; `daily_limit` only applies to
    /// new rows.
    async fn subscribe(&self, chat_id: ChatId, key: &str, daily_limit: i64)
    -> Result<(), SmsqError>;

    /// Soft-deletes the account of `chat_id`.
    async fn unsubscribe(&self, chat_id: ChatId) -> Result<(), SmsqError>;

    /// Increments `received_today` and returns the new value.
    async fn increment_received_today(&self, chat_id: ChatId) -> Result<i64, SmsqError>;

    /// Returns `delivered_today`.
    async fn delivered_today(&self, chat_id: ChatId) -> Result<i64, SmsqError>;

    /// Increments `delivered_today` alone (consumes the limit-notice slot).
    async fn increment_delivered_today(&self, chat_id: ChatId) -> Result<(), SmsqError>;

    /// Increments both `delivered_total` and `delivered_today`.
    async fn record_delivery(&self, chat_id: ChatId) -> Result<(), SmsqError>;

    /// Chats of all active accounts.
    async fn active_chats(&self) -> Result<Vec<ChatId>, SmsqError>;

    /// Aggregate subscriber statistics.
    async fn stats(&self) -> Result<SubscriberStats, SmsqError>;

    /// Changes the daily limit. Returns `false` if no account matched.
    async fn set_daily_limit(&self, chat_id: ChatId, limit: i64) -> Result<bool, SmsqError>;

    /// Persists a feedback message.
    async fn insert_feedback(&self, chat_id: ChatId, text: &str) -> Result<(), SmsqError>;

    /// Returns the last processed day boundary, creating it as zero on first read.
    async fn stored_midnight(&self) -> Result<i64, SmsqError>;

    /// Stores `midnight` and resets the daily counters of every account.
    async fn apply_rollover(&self, midnight: i64) -> Result<(), SmsqError>;
}
