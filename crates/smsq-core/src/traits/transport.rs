// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat transport trait for the bot platform (Telegram).

use async_trait::async_trait;

use crate::error::SmsqError;
use crate::traits::adapter::PluginAdapter;
use crate::types::OutboundMessage;

/// Adapter for the outbound side of the chat platform.
///
/// Inbound updates arrive through the gateway webhook and are translated
/// before they reach the relay, so the transport only sends and manages the
/// webhook registration.
#[async_trait]
pub trait ChatTransport: PluginAdapter {
    /// Sends a message.
    ///
    /// Returns [`SmsqError::RecipientBlocked`] when the recipient revoked the
    /// bot's access, and [`SmsqError::Transport`] for any other failure.
    async fn send(&self, msg: OutboundMessage) -> Result<(), SmsqError>;

    /// Registers the callback URL the platform posts updates to.
    async fn register_webhook(&self, url: &str) -> Result<(), SmsqError>;

    /// Removes the callback registration.
    async fn unregister_webhook(&self) -> Result<(), SmsqError>;
}
