// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat transport for deterministic testing.
//!
//! `MockTransport` implements `ChatTransport`, capturing every message it is
//! asked to send. Sends to selected chats can be made to fail.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use smsq_core::SmsqError;
use smsq_core::traits::adapter::PluginAdapter;
use smsq_core::traits::transport::ChatTransport;
use smsq_core::types::{AdapterType, ChatId, HealthStatus, OutboundMessage};

/// How a send to a given chat should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendFailure {
    /// The recipient blocked the bot.
    Blocked,
    /// Any other transport failure.
    Network,
}

/// A mock chat transport for testing.
///
/// Failed sends are not captured.
#[derive(Default)]
pub struct MockTransport {
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    failures: Arc<Mutex<HashMap<ChatId, SendFailure>>>,
    webhook: Arc<Mutex<Option<String>>>,
    unregistered: Arc<Mutex<bool>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `chat_id` fail with `failure`.
    pub async fn fail_for(&self, chat_id: ChatId, failure: SendFailure) {
        self.failures.lock().await.insert(chat_id, failure);
    }

    /// Let sends to `chat_id` succeed again.
    pub async fn heal(&self, chat_id: ChatId) {
        self.failures.lock().await.remove(&chat_id);
    }

    /// All successfully sent messages, oldest first.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Texts sent to `chat_id`, oldest first.
    pub async fn texts_for(&self, chat_id: ChatId) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .map(|m| m.text.clone())
            .collect()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    /// URL passed to the last `register_webhook`, if still registered.
    pub async fn webhook(&self) -> Option<String> {
        self.webhook.lock().await.clone()
    }

    /// Whether `unregister_webhook` has been called.
    pub async fn was_unregistered(&self) -> bool {
        *self.unregistered.lock().await
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, SmsqError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SmsqError> {
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send(&self, msg: OutboundMessage) -> Result<(), SmsqError> {
        match self.failures.lock().await.get(&msg.chat_id) {
            Some(SendFailure::Blocked) => Err(SmsqError::RecipientBlocked {
                chat_id: msg.chat_id.0,
            }),
            Some(SendFailure::Network) => Err(SmsqError::Transport {
                message: "connection reset".to_string(),
                source: None,
            }),
            None => {
                self.sent.lock().await.push(msg);
                Ok(())
            }
        }
    }

    async fn register_webhook(&self, url: &str) -> Result<(), SmsqError> {
        *self.webhook.lock().await = Some(url.to_string());
        Ok(())
    }

    async fn unregister_webhook(&self) -> Result<(), SmsqError> {
        *self.webhook.lock().await = None;
        *self.unregistered.lock().await = true;
        Ok(())
    }
}
