// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram chat transport for the smsq relay.
//!
//! Implements [`ChatTransport`] over the Bot API via teloxide. Updates are
//! not polled: Telegram posts them to the gateway webhook, which hands the
//! raw JSON to [`handler::parse_update`].

pub mod handler;

use std::time::Duration;

use async_trait::async_trait;
use smsq_config::model::TelegramConfig;
use smsq_core::error::SmsqError;
use smsq_core::traits::{ChatTransport, PluginAdapter};
use smsq_core::types::{AdapterType, HealthStatus, OutboundMessage, ParseMode};
use teloxide::ApiError;
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::ParseMode as TgParseMode;
use tracing::{debug, info, warn};

/// Telegram transport implementing [`ChatTransport`].
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Creates the transport with a per-request timeout.
    pub fn new(config: &TelegramConfig, timeout: Duration) -> Result<Self, SmsqError> {
        if config.bot_token.trim().is_empty() {
            return Err(SmsqError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let client = teloxide::net::default_reqwest_settings()
            .timeout(timeout)
            .build()
            .map_err(|e| SmsqError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            bot: Bot::with_client(config.bot_token.trim(), client),
        })
    }
}

#[async_trait]
impl PluginAdapter for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, SmsqError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), SmsqError> {
        debug!("Telegram transport shutting down");
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send(&self, msg: OutboundMessage) -> Result<(), SmsqError> {
        let chat_id = msg.chat_id;
        let mut request = self
            .bot
            .send_message(ChatId(chat_id.0), msg.text)
            .disable_notification(!msg.notify);
        if msg.parse_mode == ParseMode::Html {
            request = request.parse_mode(TgParseMode::Html);
        }

        match request.await {
            Ok(_) => Ok(()),
            Err(e) => {
                let err = classify_send_error(e, chat_id.0);
                if err.is_blocked() {
                    info!(chat_id = chat_id.0, "bot is blocked by the user");
                } else {
                    warn!(chat_id = chat_id.0, error = %err, "cannot send a message");
                }
                Err(err)
            }
        }
    }

    async fn register_webhook(&self, url: &str) -> Result<(), SmsqError> {
        info!("setting webhook...");
        let parsed = reqwest::Url::parse(url).map_err(|e| {
            SmsqError::Config(format!("webhook URL is invalid: {e}"))
        })?;
        self.bot
            .set_webhook(parsed)
            .await
            .map_err(|e| transport_error("failed to set webhook", e))?;

        let webhook = self
            .bot
            .get_webhook_info()
            .await
            .map_err(|e| transport_error("failed to read webhook info", e))?;
        if let Some(date) = webhook.last_error_date {
            info!(?date, "last webhook error time");
        }
        if let Some(message) = webhook.last_error_message {
            info!(%message, "last webhook error message");
        }
        info!("webhook set");
        Ok(())
    }

    async fn unregister_webhook(&self) -> Result<(), SmsqError> {
        info!("removing webhook...");
        self.bot
            .delete_webhook()
            .await
            .map_err(|e| transport_error("failed to remove webhook", e))?;
        info!("webhook removed");
        Ok(())
    }
}

/// Maps a send failure to [`SmsqError::RecipientBlocked`] when Telegram
/// answered 403 Forbidden, and to [`SmsqError::Transport`] otherwise.
pub fn classify_send_error(err: RequestError, chat_id: i64) -> SmsqError {
    let forbidden = match &err {
        RequestError::Api(api) => match api {
            ApiError::BotBlocked
            | ApiError::BotKicked
            | ApiError::UserDeactivated
            | ApiError::CantInitiateConversation
            | ApiError::CantTalkWithBots => true,
            ApiError::Unknown(description) => description.starts_with("Forbidden"),
            _ => false,
        },
        _ => false,
    };
    if forbidden {
        SmsqError::RecipientBlocked { chat_id }
    } else {
        transport_error("failed to send message", err)
    }
}

fn transport_error(context: &str, err: RequestError) -> SmsqError {
    SmsqError::Transport {
        message: format!("{context}: {err}"),
        source: Some(Box::new(err)),
    }
}
