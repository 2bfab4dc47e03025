// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the smsq relay.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level smsq configuration.
///
/// Required values (bot token, operator id, key path, webhook domain) have
/// empty defaults so that a missing value surfaces as a validation error
/// listing every gap at once.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmsqConfig {
    /// HTTP listener and timing settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Telegram bot settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Key material for envelope decryption.
    #[serde(default)]
    pub crypto: CryptoConfig,

    /// Per-account rate limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Challenge/response pairs answered by the `/challenge` command.
    #[serde(default)]
    pub challenges: BTreeMap<String, String>,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address the gateway binds to.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Public base URL Telegram posts webhook updates to (e.g. `https://bot.example.com`).
    #[serde(default)]
    pub webhook_domain: String,

    /// Timeout for outbound Bot API requests.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How long a delivery request waits for the relay before answering 504.
    #[serde(default = "default_reply_timeout_secs")]
    pub reply_timeout_secs: u64,

    /// Interval between rollover checks.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            webhook_domain: String::new(),
            timeout_secs: default_timeout_secs(),
            reply_timeout_secs: default_reply_timeout_secs(),
            tick_interval_secs: default_tick_interval_secs(),
        }
    }
}

fn default_listen_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_reply_timeout_secs() -> u64 {
    60
}

fn default_tick_interval_secs() -> u64 {
    600
}

/// Telegram bot configuration.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token.
    #[serde(default)]
    pub bot_token: String,

    /// Chat id of the operator allowed to run admin commands.
    #[serde(default)]
    pub admin_id: i64,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field(
                "bot_token",
                &if self.bot_token.is_empty() { "" } else { "[redacted]" },
            )
            .field("admin_id", &self.admin_id)
            .finish()
    }
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "smsq.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Envelope decryption key configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CryptoConfig {
    /// Path to the file holding the base64 X25519 private key.
    #[serde(default)]
    pub private_key_path: String,
}

/// Rate limit configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Envelopes accepted per account per day before every further one is rejected.
    #[serde(default = "default_received_limit")]
    pub received_limit: i64,

    /// Daily delivered-message limit given to new accounts.
    #[serde(default = "default_delivered_limit")]
    pub delivered_limit: i64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            received_limit: default_received_limit(),
            delivered_limit: default_delivered_limit(),
        }
    }
}

fn default_received_limit() -> i64 {
    1000
}

fn default_delivered_limit() -> i64 {
    200
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level for smsq crates (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telegram_debug_redacts_token() {
        let config = TelegramConfig {
            bot_token: "123:secret".into(),
            admin_id: 42,
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("[redacted]"));
        assert!(rendered.contains("42"));
    }

    #[test]
    fn challenges_deserialize_as_table() {
        let config: SmsqConfig = toml::from_str(
            r#"
[challenges]
ping = "pong"
"#,
        )
        .unwrap();
        assert_eq!(config.challenges.get("ping").map(String::as_str), Some("pong"));
    }
}
