// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the smsq relay.

use thiserror::Error;

/// The primary error type used across all smsq adapter traits and core operations.
#[derive(Debug, Error)]
pub enum SmsqError {
    /// Configuration errors (invalid TOML, missing required fields, unreadable key material).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Chat transport errors (network failure, API error, webhook registration).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The recipient revoked the bot's access to the chat.
    #[error("bot is blocked by chat {chat_id}")]
    RecipientBlocked { chat_id: i64 },

    /// Key handling or decryption failure.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SmsqError {
    /// Wraps any error as a storage failure.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        SmsqError::Storage {
            source: Box::new(err),
        }
    }

    /// Returns `true` if the error means the recipient blocked the bot.
    pub fn is_blocked(&self) -> bool {
        matches!(self, SmsqError::RecipientBlocked { .. })
    }
}
