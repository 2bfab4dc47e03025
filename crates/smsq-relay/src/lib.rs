// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The smsq relay: a single writer that owns all subscriber state.
//!
//! Network handlers never touch the record store. They submit [`Event`]s
//! through an [`EventSender`]; one [`EventLoop`] task applies them strictly
//! in arrival order, so counter updates for an account never interleave.
//!
//! - [`delivery`]: rate limiting and outcome classification for one SMS.
//! - [`commands`]: user and operator chat commands.
//! - [`rollover`]: the daily reset of per-day counters.

pub mod commands;
pub mod delivery;
pub mod event;
pub mod format;
pub mod rollover;
pub mod shutdown;

use std::collections::BTreeMap;
use std::sync::Arc;

use smsq_config::SmsqConfig;
use smsq_core::types::{ChatId, OutboundMessage};
use smsq_core::{ChatTransport, RecordStore};
use tracing::debug;

pub use event::{Event, EventLoop, EventSender, event_channel, spawn_ticker};
pub use shutdown::install_signal_handler;

/// Limits and operator settings the relay enforces.
#[derive(Debug, Clone)]
pub struct RelayPolicy {
    /// Chat allowed to run operator commands.
    pub admin_id: ChatId,
    /// Envelopes accepted per account per day.
    pub received_limit: i64,
    /// Daily delivery limit given to new accounts.
    pub delivered_limit: i64,
    /// `/challenge` argument to reply table.
    pub challenges: BTreeMap<String, String>,
}

impl RelayPolicy {
    pub fn from_config(config: &SmsqConfig) -> Self {
        Self {
            admin_id: ChatId(config.telegram.admin_id),
            received_limit: config.limits.received_limit,
            delivered_limit: config.limits.delivered_limit,
            challenges: config.challenges.clone(),
        }
    }
}

/// State-mutating operations of the relay.
///
/// Every method assumes it is the only writer; [`EventLoop`] guarantees it.
pub struct Relay {
    store: Arc<dyn RecordStore>,
    transport: Arc<dyn ChatTransport>,
    policy: RelayPolicy,
}

impl Relay {
    pub fn new(
        store: Arc<dyn RecordStore>,
        transport: Arc<dyn ChatTransport>,
        policy: RelayPolicy,
    ) -> Self {
        Self {
            store,
            transport,
            policy,
        }
    }

    pub fn transport(&self) -> &Arc<dyn ChatTransport> {
        &self.transport
    }

    /// Sends a silent plain-text reply. Failures are logged by the transport
    /// and otherwise ignored.
    async fn reply(&self, chat_id: ChatId, text: impl Into<String>) {
        self.send_ignoring_errors(OutboundMessage::plain(chat_id, text))
            .await;
    }

    async fn send_ignoring_errors(&self, msg: OutboundMessage) {
        let chat_id = msg.chat_id;
        if let Err(e) = self.transport.send(msg).await {
            debug!(chat_id = chat_id.0, error = %e, "reply not delivered");
        }
    }
}
