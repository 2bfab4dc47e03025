// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat command routing.
//!
//! Operator commands are only recognized from the configured admin chat.
//! From any other chat they fall through to the user command set and are
//! answered as unknown.

use std::str::FromStr;

use smsq_core::SmsqError;
use smsq_core::types::{ChatId, ChatUpdate, OutboundMessage};
use smsq_crypto::is_admissible;
use smsq_prometheus::record_command;
use strum::{EnumString, IntoStaticStr};
use tracing::{debug, info};

use crate::Relay;
use crate::format::HELP_TEXT;

pub const PRIVATE_CHAT_ONLY: &str = "smsq_bot works only in a private chat";
pub const UNKNOWN_COMMAND: &str = "Unknown command";
pub const INSTALL_HINT: &str = "Install smsQ application on your phone https://smsq.me";
pub const ALREADY_SET_UP: &str = "You are already set up!";
pub const PREVIOUS_REVOKED: &str = "Your previous subscription is revoked";
pub const OTHER_ACCOUNT_REVOKED: &str = "Subscription on other Telegram account has been revoked";
pub const REVOKED_FROM_OTHER: &str =
    "Your subscription has been revoked from other Telegram account";
pub const CONGRATULATIONS: &str = "Congratulations! You should see here new SMS messages";

/// Commands the bot understands. Matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Command {
    Start,
    Stop,
    Feedback,
    Challenge,
    Help,
    Stat,
    Broadcast,
    Direct,
    Limit,
}

impl Command {
    /// Whether the command is reserved for the operator chat.
    pub fn is_admin(self) -> bool {
        matches!(
            self,
            Command::Stat | Command::Broadcast | Command::Direct | Command::Limit
        )
    }
}

impl Relay {
    /// Applies one chat update.
    pub async fn handle_chat_update(&self, update: &ChatUpdate) -> Result<(), SmsqError> {
        match update {
            ChatUpdate::NonPrivateChat { chat_id } => {
                debug!(chat_id = chat_id.0, "addressed outside a private chat");
                self.reply(*chat_id, PRIVATE_CHAT_ONLY).await;
                Ok(())
            }
            ChatUpdate::Command {
                chat_id,
                command,
                arguments,
            } => self.handle_command(*chat_id, command, arguments).await,
        }
    }

    async fn handle_command(
        &self,
        chat_id: ChatId,
        command: &str,
        arguments: &str,
    ) -> Result<(), SmsqError> {
        let parsed = Command::from_str(command)
            .ok()
            .filter(|c| !c.is_admin() || chat_id == self.policy.admin_id);
        record_command(parsed.map_or("unknown", <&'static str>::from));
        debug!(chat_id = chat_id.0, command, "command received");

        let Some(command) = parsed else {
            self.reply(chat_id, UNKNOWN_COMMAND).await;
            return Ok(());
        };

        match command {
            Command::Start => self.start(chat_id, arguments).await,
            Command::Stop => self.stop(chat_id).await,
            Command::Feedback => self.feedback(chat_id, arguments).await,
            Command::Challenge => {
                let reply = self
                    .policy
                    .challenges
                    .get(arguments)
                    .map_or(UNKNOWN_COMMAND, String::as_str);
                self.reply(chat_id, reply).await;
                Ok(())
            }
            Command::Help => {
                self.send_ignoring_errors(OutboundMessage::html(chat_id, HELP_TEXT))
                    .await;
                Ok(())
            }
            Command::Stat => self.stat().await,
            Command::Broadcast => self.broadcast(arguments).await,
            Command::Direct => {
                self.direct(arguments).await;
                Ok(())
            }
            Command::Limit => self.limit(arguments).await,
        }
    }

    async fn start(&self, chat_id: ChatId, key: &str) -> Result<(), SmsqError> {
        if key.is_empty() && self.store.user_exists(chat_id).await? {
            self.reply(chat_id, ALREADY_SET_UP).await;
            return Ok(());
        }
        if key.is_empty() || !is_admissible(key) {
            self.reply(chat_id, INSTALL_HINT).await;
            return Ok(());
        }

        let current_key = self.store.key_for_chat(chat_id).await?;
        if current_key.as_deref() == Some(key) {
            self.reply(chat_id, ALREADY_SET_UP).await;
            return Ok(());
        }
        if current_key.is_some() {
            self.reply(chat_id, PREVIOUS_REVOKED).await;
        }

        if let Some(previous) = self.store.binding_for_key(key).await? {
            if previous.chat_id != chat_id {
                self.reply(chat_id, OTHER_ACCOUNT_REVOKED).await;
                self.reply(previous.chat_id, REVOKED_FROM_OTHER).await;
            }
        }

        self.store
            .subscribe(chat_id, key, self.policy.delivered_limit)
            .await?;
        info!(chat_id = chat_id.0, "subscription created");
        self.reply(chat_id, CONGRATULATIONS).await;
        Ok(())
    }

    async fn stop(&self, chat_id: ChatId) -> Result<(), SmsqError> {
        self.store.unsubscribe(chat_id).await?;
        info!(chat_id = chat_id.0, "subscription revoked");
        self.reply(chat_id, "Access revoked").await;
        Ok(())
    }

    async fn feedback(&self, chat_id: ChatId, text: &str) -> Result<(), SmsqError> {
        if text.is_empty() {
            self.reply(chat_id, "Command format: /feedback <text>").await;
            return Ok(());
        }
        self.store.insert_feedback(chat_id, text).await?;
        self.reply(chat_id, "Thank you for your feedback").await;
        let forward = OutboundMessage::plain(
            self.policy.admin_id,
            format!("Feedback from {chat_id}: {text}"),
        )
        .with_notify(true);
        self.send_ignoring_errors(forward).await;
        Ok(())
    }

    async fn stat(&self) -> Result<(), SmsqError> {
        let stats = self.store.stats().await?;
        let text = format!(
            "users: {}\nactive users: {}\nsmses: {}\nsmses today: {}",
            stats.users, stats.active_users, stats.delivered_total, stats.delivered_today
        );
        self.reply(self.policy.admin_id, text).await;
        Ok(())
    }

    async fn broadcast(&self, text: &str) -> Result<(), SmsqError> {
        if text.is_empty() {
            return Ok(());
        }
        let chats = self.store.active_chats().await?;
        info!(recipients = chats.len(), "broadcasting");
        for chat in chats {
            self.send_ignoring_errors(OutboundMessage::plain(chat, text).with_notify(true))
                .await;
        }
        self.reply(self.policy.admin_id, "OK").await;
        Ok(())
    }

    async fn direct(&self, arguments: &str) {
        let admin = self.policy.admin_id;
        let Some((whom, text)) = arguments.split_once(' ') else {
            self.reply(admin, "Usage: /direct chatID text").await;
            return;
        };
        let Ok(whom) = whom.parse::<i64>() else {
            self.reply(admin, "First argument is invalid").await;
            return;
        };
        if text.is_empty() {
            return;
        }
        self.send_ignoring_errors(OutboundMessage::plain(ChatId(whom), text).with_notify(true))
            .await;
        self.reply(admin, "OK").await;
    }

    async fn limit(&self, arguments: &str) -> Result<(), SmsqError> {
        let admin = self.policy.admin_id;
        let Some((whom, limit)) = arguments.split_once(' ') else {
            self.reply(admin, "Usage: /limit chatID text").await;
            return Ok(());
        };
        let Ok(whom) = whom.parse::<i64>() else {
            self.reply(admin, "First argument is invalid").await;
            return Ok(());
        };
        let Ok(limit) = limit.parse::<i64>() else {
            self.reply(admin, "Second argument is invalid").await;
            return Ok(());
        };
        let answer = if self.store.set_daily_limit(ChatId(whom), limit).await? {
            info!(chat_id = whom, limit, "daily limit changed");
            "OK"
        } else {
            "User not found"
        };
        self.reply(admin, answer).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_case_insensitively() {
        assert_eq!(Command::from_str("start").ok(), Some(Command::Start));
        assert_eq!(Command::from_str("HELP").ok(), Some(Command::Help));
        assert_eq!(Command::from_str("Broadcast").ok(), Some(Command::Broadcast));
        assert!(Command::from_str("launch").is_err());
        assert!(Command::from_str("").is_err());
    }

    #[test]
    fn operator_commands_are_flagged() {
        for c in [Command::Stat, Command::Broadcast, Command::Direct, Command::Limit] {
            assert!(c.is_admin());
        }
        for c in [
            Command::Start,
            Command::Stop,
            Command::Feedback,
            Command::Challenge,
            Command::Help,
        ] {
            assert!(!c.is_admin());
        }
    }

    #[test]
    fn metric_labels_are_lowercase_names() {
        assert_eq!(<&str>::from(Command::Feedback), "feedback");
        assert_eq!(<&str>::from(Command::Limit), "limit");
    }
}
