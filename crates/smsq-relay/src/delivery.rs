// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery of one decrypted envelope to its subscriber.

use smsq_core::SmsqError;
use smsq_core::types::{DeliveryOutcome, OutboundMessage, SmsEnvelope};
use smsq_prometheus::record_delivery;
use tracing::{debug, info, warn};

use crate::Relay;
use crate::format::{limit_notice, notification};

impl Relay {
    /// Delivers `envelope` to the chat bound to its key.
    ///
    /// Returns the outcome reported to the companion application. `Err` is
    /// reserved for record store failures, which the event loop treats as
    /// fatal.
    pub async fn deliver(&self, envelope: &SmsEnvelope) -> Result<DeliveryOutcome, SmsqError> {
        let outcome = self.deliver_inner(envelope).await?;
        record_delivery(outcome);
        debug!(outcome = %outcome, "delivery finished");
        Ok(outcome)
    }

    async fn deliver_inner(&self, envelope: &SmsEnvelope) -> Result<DeliveryOutcome, SmsqError> {
        if envelope.key.is_empty() {
            return Ok(DeliveryOutcome::UserNotFound);
        }
        let Some(binding) = self.store.binding_for_key(&envelope.key).await? else {
            return Ok(DeliveryOutcome::UserNotFound);
        };
        let chat_id = binding.chat_id;

        let received = self.store.increment_received_today(chat_id).await?;
        if received > self.policy.received_limit {
            if received == self.policy.received_limit + 1 {
                info!(chat_id = chat_id.0, "received limit reached");
            }
            return Ok(DeliveryOutcome::RateLimited);
        }

        let delivered_today = self.store.delivered_today(chat_id).await?;
        if delivered_today >= binding.daily_limit {
            if delivered_today == binding.daily_limit {
                // The notice consumes one slot so it goes out once per day.
                self.store.increment_delivered_today(chat_id).await?;
                let notice = OutboundMessage::plain(chat_id, limit_notice(binding.daily_limit))
                    .with_notify(true);
                self.send_ignoring_errors(notice).await;
            }
            return Ok(DeliveryOutcome::RateLimited);
        }

        let msg = OutboundMessage::html(chat_id, notification(envelope)).with_notify(true);
        match self.transport.send(msg).await {
            Ok(()) => {
                self.store.record_delivery(chat_id).await?;
                Ok(DeliveryOutcome::Delivered)
            }
            Err(e) if e.is_blocked() => {
                info!(chat_id = chat_id.0, "subscriber blocked the bot");
                Ok(DeliveryOutcome::Blocked)
            }
            Err(e) => {
                warn!(chat_id = chat_id.0, error = %e, "notification not sent");
                Ok(DeliveryOutcome::NetworkError)
            }
        }
    }
}
