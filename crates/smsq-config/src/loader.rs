// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the hierarchy `./smsq.toml` > `~/.config/smsq/smsq.toml` > `/etc/smsq/smsq.toml`
//! with environment variable overrides via the `SMSQ_` prefix and the legacy
//! unprefixed `BOT_TOKEN`, `ADMIN_ID` and `DOMAIN` variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SmsqConfig;

/// Sections addressable through `SMSQ_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &["server", "telegram", "storage", "crypto", "limits", "logging"];

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/smsq/smsq.toml` (system-wide)
/// 3. `~/.config/smsq/smsq.toml` (user config)
/// 4. `./smsq.toml` (local directory)
/// 5. `SMSQ_*` environment variables
/// 6. Legacy `BOT_TOKEN`, `ADMIN_ID`, `DOMAIN` environment variables
pub fn load_config() -> Result<SmsqConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<SmsqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SmsqConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SmsqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SmsqConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .merge(legacy_env_provider())
        .extract()
}

/// Build the Figment used for standard config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SmsqConfig::default()))
        .merge(Toml::file("/etc/smsq/smsq.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("smsq/smsq.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("smsq.toml"))
        .merge(env_provider())
        .merge(legacy_env_provider())
}

/// `SMSQ_*` provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `SMSQ_TELEGRAM_BOT_TOKEN` must become `telegram.bot_token`.
fn env_provider() -> Env {
    Env::prefixed("SMSQ_").map(|key| map_section_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped variable name onto its dotted path.
fn map_section_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

/// Unprefixed variables kept for deployments that predate `SMSQ_`.
fn legacy_env_provider() -> Env {
    Env::raw()
        .only(&["BOT_TOKEN", "ADMIN_ID", "DOMAIN"])
        .map(|key| match key.as_str() {
            "bot_token" => "telegram.bot_token".into(),
            "admin_id" => "telegram.admin_id".into(),
            "domain" => "server.webhook_domain".into(),
            other => other.to_string().into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_keys_keep_inner_underscores() {
        assert_eq!(map_section_key("telegram_bot_token"), "telegram.bot_token");
        assert_eq!(map_section_key("limits_received_limit"), "limits.received_limit");
        assert_eq!(map_section_key("server_webhook_domain"), "server.webhook_domain");
    }

    #[test]
    fn unknown_section_passes_through() {
        assert_eq!(map_section_key("bogus_key"), "bogus_key");
    }
}
