// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the relay, its adapters, and the gateway.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identity of a chat endpoint on the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Transport,
    Storage,
    Observability,
}

/// Terminal classification of one delivery attempt.
///
/// Serialized as the snake_case name, which is the wire value the companion
/// application expects in the `result` field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered,
    NetworkError,
    Blocked,
    BadRequest,
    UserNotFound,
    ApiRetired,
    RateLimited,
}

/// What the companion application captured.
///
/// Kinds this relay does not know, and a `null` kind, are treated as plain
/// SMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmsKind {
    #[default]
    Sms,
    IncomingCall,
    #[serde(other)]
    Other,
}

fn kind_or_sms<'de, D>(deserializer: D) -> Result<SmsKind, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let kind = Option::<SmsKind>::deserialize(deserializer)?.unwrap_or_default();
    Ok(match kind {
        SmsKind::Other => SmsKind::Sms,
        known => known,
    })
}

/// One decrypted SMS message submitted for delivery.
///
/// Unknown fields are ignored so newer companion builds can add fields
/// without breaking older relays.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SmsEnvelope {
    /// Subscription key claimed by the sender.
    #[serde(default)]
    pub key: String,
    /// Companion-local message id.
    #[serde(default)]
    pub id: i64,
    #[serde(default, rename = "type", deserialize_with = "kind_or_sms")]
    pub kind: SmsKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub sim: String,
    #[serde(default)]
    pub carrier: String,
    #[serde(default)]
    pub sender: String,
    /// Unix timestamp (seconds) when the message was received on the device.
    #[serde(default)]
    pub timestamp: i64,
    /// Device UTC offset in seconds at `timestamp`.
    #[serde(default, rename = "offset")]
    pub utc_offset_seconds: i32,
}

/// How the transport should interpret outbound text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    #[default]
    Plain,
    Html,
}

/// A message to be sent to one chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub parse_mode: ParseMode,
    /// `false` delivers the message silently.
    pub notify: bool,
}

impl OutboundMessage {
    /// A silent plain-text message, the default for bot replies.
    pub fn plain(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            parse_mode: ParseMode::Plain,
            notify: false,
        }
    }

    /// An HTML-formatted message.
    pub fn html(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            parse_mode: ParseMode::Html,
            notify: false,
        }
    }

    /// Enables or disables the recipient's notification.
    pub fn with_notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }
}

/// A chat event relevant to the relay, already stripped of transport details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatUpdate {
    /// A bot command from a private chat.
    Command {
        chat_id: ChatId,
        command: String,
        arguments: String,
    },
    /// The bot was addressed from a group or channel, or added to one.
    NonPrivateChat { chat_id: ChatId },
}

/// A subscriber record as persisted by the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub chat_id: ChatId,
    pub key: String,
    pub daily_limit: i64,
    pub delivered_total: i64,
    pub delivered_today: i64,
    pub received_today: i64,
    pub deleted: bool,
}

/// The active owner of a subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub chat_id: ChatId,
    pub daily_limit: i64,
}

/// Aggregate numbers shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubscriberStats {
    /// Non-deleted accounts.
    pub users: i64,
    /// Non-deleted accounts with at least one delivered message.
    pub active_users: i64,
    /// Lifetime delivered messages across all rows.
    pub delivered_total: i64,
    /// Delivered messages since the last rollover across all rows.
    pub delivered_today: i64,
}
