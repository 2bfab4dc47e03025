// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for relay integration testing.
//!
//! `RelayHarness` assembles a [`Relay`] over an in-memory SQLite store and a
//! [`MockTransport`], and exposes helpers that drive it the way the event
//! loop would.

use std::collections::BTreeMap;
use std::sync::Arc;

use smsq_config::model::StorageConfig;
use smsq_core::types::{ChatId, ChatUpdate, DeliveryOutcome, SmsEnvelope, UserAccount};
use smsq_core::{RecordStore, SmsqError};
use smsq_relay::{EventLoop, EventSender, Relay, RelayPolicy, event_channel};
use smsq_storage::{Database, SqliteStore};

use crate::mock_transport::MockTransport;

/// Operator chat used by default.
pub const ADMIN: ChatId = ChatId(1000);

/// Builder for creating relay test environments.
pub struct RelayHarnessBuilder {
    policy: RelayPolicy,
}

impl RelayHarnessBuilder {
    fn new() -> Self {
        Self {
            policy: RelayPolicy {
                admin_id: ADMIN,
                received_limit: 1000,
                delivered_limit: 200,
                challenges: BTreeMap::new(),
            },
        }
    }

    pub fn with_received_limit(mut self, limit: i64) -> Self {
        self.policy.received_limit = limit;
        self
    }

    /// Daily limit given to newly subscribed accounts.
    pub fn with_delivered_limit(mut self, limit: i64) -> Self {
        self.policy.delivered_limit = limit;
        self
    }

    pub fn with_challenge(mut self, challenge: &str, reply: &str) -> Self {
        self.policy
            .challenges
            .insert(challenge.to_string(), reply.to_string());
        self
    }

    /// Build the harness with a fresh in-memory store.
    pub async fn build(self) -> Result<RelayHarness, SmsqError> {
        let db = Database::open_in_memory().await?;
        let config = StorageConfig {
            database_path: ":memory:".to_string(),
            wal_mode: false,
        };
        let store = Arc::new(SqliteStore::with_database(config, db));
        let transport = Arc::new(MockTransport::new());
        Ok(RelayHarness {
            store,
            transport,
            policy: self.policy,
        })
    }
}

/// A relay test environment.
///
/// Every call to [`RelayHarness::relay`] creates a relay over the same store
/// and transport, so state persists across calls.
pub struct RelayHarness {
    pub store: Arc<SqliteStore>,
    pub transport: Arc<MockTransport>,
    pub policy: RelayPolicy,
}

impl RelayHarness {
    pub fn builder() -> RelayHarnessBuilder {
        RelayHarnessBuilder::new()
    }

    /// Harness with default limits.
    pub async fn new() -> Result<Self, SmsqError> {
        Self::builder().build().await
    }

    pub fn relay(&self) -> Relay {
        Relay::new(
            self.store.clone(),
            self.transport.clone(),
            self.policy.clone(),
        )
    }

    /// Event channel over a fresh relay.
    pub fn event_channel(&self, capacity: usize) -> (EventSender, EventLoop) {
        event_channel(self.relay(), capacity)
    }

    /// Applies a command from `chat_id`.
    pub async fn command(
        &self,
        chat_id: ChatId,
        command: &str,
        arguments: &str,
    ) -> Result<(), SmsqError> {
        let update = ChatUpdate::Command {
            chat_id,
            command: command.to_string(),
            arguments: arguments.to_string(),
        };
        self.relay().handle_chat_update(&update).await
    }

    /// Subscribes `chat_id` with `key` through `/start` and forgets the replies.
    pub async fn subscribe(&self, chat_id: ChatId, key: &str) -> Result<(), SmsqError> {
        self.command(chat_id, "start", key).await?;
        self.transport.clear_sent().await;
        Ok(())
    }

    /// Delivers a plain SMS with `text` for `key`.
    pub async fn deliver(&self, key: &str, text: &str) -> Result<DeliveryOutcome, SmsqError> {
        self.relay().deliver(&envelope(key, text)).await
    }

    pub async fn account(&self, chat_id: ChatId) -> Result<Option<UserAccount>, SmsqError> {
        self.store.account(chat_id).await
    }

    /// Texts sent to `chat_id` so far.
    pub async fn texts(&self, chat_id: ChatId) -> Vec<String> {
        self.transport.texts_for(chat_id).await
    }
}

/// A plain SMS envelope stamped at 2023-11-14 22:13:20 UTC.
pub fn envelope(key: &str, text: &str) -> SmsEnvelope {
    SmsEnvelope {
        key: key.to_string(),
        text: text.to_string(),
        sender: "+15550100".to_string(),
        sim: "SIM1".to_string(),
        timestamp: 1_700_000_000,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_builds_with_empty_store() {
        let harness = RelayHarness::new().await.unwrap();
        assert!(harness.account(ChatId(1)).await.unwrap().is_none());
        assert_eq!(harness.transport.sent_count().await, 0);
        assert_eq!(harness.policy.admin_id, ADMIN);
    }
}
