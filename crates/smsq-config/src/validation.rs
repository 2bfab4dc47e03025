// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: required values, parseable socket
//! addresses, positive limits and durations, a known log level.

use std::net::SocketAddr;

use crate::diagnostic::ConfigError;
use crate::model::SmsqConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &SmsqConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config
        .server
        .listen_address
        .trim()
        .parse::<SocketAddr>()
        .is_err()
    {
        fail(format!(
            "server.listen_address `{}` is not a valid socket address",
            config.server.listen_address
        ));
    }

    let domain = config.server.webhook_domain.trim();
    if domain.is_empty() {
        fail("server.webhook_domain must be set".to_string());
    } else if !(domain.starts_with("https://") || domain.starts_with("http://")) {
        fail(format!(
            "server.webhook_domain `{domain}` must start with https:// or http://"
        ));
    }

    for (name, value) in [
        ("server.timeout_secs", config.server.timeout_secs),
        ("server.reply_timeout_secs", config.server.reply_timeout_secs),
        ("server.tick_interval_secs", config.server.tick_interval_secs),
    ] {
        if value == 0 {
            fail(format!("{name} must be greater than zero"));
        }
    }

    let token = config.telegram.bot_token.trim();
    if token.is_empty() {
        fail("telegram.bot_token must be set".to_string());
    } else if !token.contains(':') {
        fail("telegram.bot_token must have the form <bot id>:<secret>".to_string());
    }

    if config.telegram.admin_id == 0 {
        fail("telegram.admin_id must be set".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.crypto.private_key_path.trim().is_empty() {
        fail("crypto.private_key_path must be set".to_string());
    }

    if config.limits.received_limit < 1 {
        fail(format!(
            "limits.received_limit must be at least 1, got {}",
            config.limits.received_limit
        ));
    }

    if config.limits.delivered_limit < 1 {
        fail(format!(
            "limits.delivered_limit must be at least 1, got {}",
            config.limits.delivered_limit
        ));
    }

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        fail(format!(
            "logging.level `{}` must be one of {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_config() -> SmsqConfig {
        let mut config = SmsqConfig::default();
        config.server.webhook_domain = "https://bot.example.com".to_string();
        config.telegram.bot_token = "123:abc".to_string();
        config.telegram.admin_id = 42;
        config.crypto.private_key_path = "/etc/smsq/key".to_string();
        config
    }

    fn messages(errors: &[ConfigError]) -> Vec<String> {
        errors.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn complete_config_validates() {
        assert!(validate_config(&complete_config()).is_ok());
    }

    #[test]
    fn default_config_reports_every_missing_value() {
        let errors = validate_config(&SmsqConfig::default()).unwrap_err();
        let all = messages(&errors).join("\n");
        assert!(all.contains("webhook_domain"));
        assert!(all.contains("bot_token"));
        assert!(all.contains("admin_id"));
        assert!(all.contains("private_key_path"));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn bad_listen_address_fails() {
        let mut config = complete_config();
        config.server.listen_address = "localhost".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors)[0].contains("listen_address"));
    }

    #[test]
    fn zero_limits_fail() {
        let mut config = complete_config();
        config.limits.received_limit = 0;
        config.limits.delivered_limit = -1;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn token_without_bot_id_fails() {
        let mut config = complete_config();
        config.telegram.bot_token = "abc".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors)[0].contains("<bot id>"));
    }

    #[test]
    fn unknown_log_level_fails() {
        let mut config = complete_config();
        config.logging.level = "verbose".to_string();
        assert!(validate_config(&config).is_err());
    }
}
