// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Translation of webhook updates into relay [`ChatUpdate`]s.
//!
//! Only commands matter to the relay. A command sent in a private chat
//! becomes [`ChatUpdate::Command`]; a command in a group or channel, or the
//! bot being added to a group, becomes [`ChatUpdate::NonPrivateChat`] so the
//! relay can explain that it only works privately. Everything else is
//! dropped.

use smsq_core::types::{ChatId, ChatUpdate};
use teloxide::types::{Message, Update, UpdateKind};
use tracing::debug;

/// Deserializes the JSON body Telegram posts to the webhook.
pub fn parse_update(body: &[u8]) -> Result<Update, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Bot user id, which is the numeric prefix of the token.
pub fn bot_id_from_token(token: &str) -> Option<u64> {
    token.split_once(':')?.0.parse().ok()
}

/// Converts an update into the event the relay acts on, if any.
pub fn translate_update(update: &Update, bot_id: u64) -> Option<ChatUpdate> {
    match &update.kind {
        UpdateKind::Message(msg) => translate_message(msg, bot_id),
        UpdateKind::ChannelPost(post) => {
            parse_command(post.text()?)?;
            Some(ChatUpdate::NonPrivateChat {
                chat_id: ChatId(post.chat.id.0),
            })
        }
        _ => None,
    }
}

fn translate_message(msg: &Message, bot_id: u64) -> Option<ChatUpdate> {
    let chat_id = ChatId(msg.chat.id.0);

    if let Some(members) = msg.new_chat_members() {
        if members.is_empty() {
            return None;
        }
        return members
            .iter()
            .any(|m| m.id.0 == bot_id)
            .then_some(ChatUpdate::NonPrivateChat { chat_id });
    }

    let (command, arguments) = parse_command(msg.text()?)?;
    if !msg.chat.is_private() {
        debug!(chat_id = chat_id.0, %command, "command outside a private chat");
        return Some(ChatUpdate::NonPrivateChat { chat_id });
    }

    Some(ChatUpdate::Command {
        chat_id,
        command,
        arguments,
    })
}

/// Splits `/Command@bot_name some args` into `("command", "some args")`.
///
/// The command is lowercased and the bot mention dropped. Returns `None`
/// when the text is not a command.
pub fn parse_command(text: &str) -> Option<(String, String)> {
    let rest = text.strip_prefix('/')?;
    let (head, arguments) = match rest.split_once(char::is_whitespace) {
        Some((head, arguments)) => (head, arguments.trim()),
        None => (rest, ""),
    };
    let command = head.split('@').next().unwrap_or_default();
    if command.is_empty() {
        return None;
    }
    Some((command.to_lowercase(), arguments.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BOT_ID: u64 = 777;

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).expect("failed to deserialize mock update")
    }

    fn private_text(chat_id: i64, text: &str) -> Update {
        update(json!({
            "update_id": 1,
            "message": {
                "message_id": 1,
                "date": 1700000000i64,
                "chat": { "id": chat_id, "type": "private", "first_name": "Test" },
                "from": { "id": chat_id, "is_bot": false, "first_name": "Test" },
                "text": text,
            }
        }))
    }

    fn group_text(text: &str) -> Update {
        update(json!({
            "update_id": 2,
            "message": {
                "message_id": 1,
                "date": 1700000000i64,
                "chat": { "id": -100123i64, "type": "supergroup", "title": "Group" },
                "from": { "id": 5, "is_bot": false, "first_name": "Test" },
                "text": text,
            }
        }))
    }

    #[test]
    fn private_command_is_translated() {
        let result = translate_update(&private_text(42, "/start abc123"), BOT_ID);
        assert_eq!(
            result,
            Some(ChatUpdate::Command {
                chat_id: ChatId(42),
                command: "start".into(),
                arguments: "abc123".into(),
            })
        );
    }

    #[test]
    fn plain_text_is_ignored() {
        assert_eq!(translate_update(&private_text(42, "hello"), BOT_ID), None);
    }

    #[test]
    fn group_command_gets_private_only_notice() {
        assert_eq!(
            translate_update(&group_text("/help"), BOT_ID),
            Some(ChatUpdate::NonPrivateChat {
                chat_id: ChatId(-100123)
            })
        );
        assert_eq!(translate_update(&group_text("just chatting"), BOT_ID), None);
    }

    #[test]
    fn bot_added_to_group_gets_notice() {
        let added = |member_id: u64| {
            update(json!({
                "update_id": 3,
                "message": {
                    "message_id": 1,
                    "date": 1700000000i64,
                    "chat": { "id": -5i64, "type": "group", "title": "Group" },
                    "from": { "id": 5, "is_bot": false, "first_name": "Test" },
                    "new_chat_members": [
                        { "id": member_id, "is_bot": true, "first_name": "Bot" }
                    ],
                }
            }))
        };
        assert_eq!(
            translate_update(&added(BOT_ID), BOT_ID),
            Some(ChatUpdate::NonPrivateChat { chat_id: ChatId(-5) })
        );
        assert_eq!(translate_update(&added(999), BOT_ID), None);
    }

    #[test]
    fn channel_post_command_gets_notice() {
        let post = update(json!({
            "update_id": 4,
            "channel_post": {
                "message_id": 1,
                "date": 1700000000i64,
                "chat": { "id": -1001i64, "type": "channel", "title": "News" },
                "text": "/start",
            }
        }));
        assert_eq!(
            translate_update(&post, BOT_ID),
            Some(ChatUpdate::NonPrivateChat {
                chat_id: ChatId(-1001)
            })
        );
    }

    #[test]
    fn parse_update_reads_webhook_body() {
        let body = br#"{"update_id":9,"message":{"message_id":1,"date":1700000000,
            "chat":{"id":8,"type":"private","first_name":"T"},"text":"/stop"}}"#;
        let parsed = parse_update(body).unwrap();
        assert!(matches!(
            translate_update(&parsed, BOT_ID),
            Some(ChatUpdate::Command { command, .. }) if command == "stop"
        ));
    }

    #[test]
    fn parse_command_handles_mentions_and_case() {
        assert_eq!(
            parse_command("/Feedback@smsq_bot  great   app "),
            Some(("feedback".into(), "great   app".into()))
        );
        assert_eq!(parse_command("/stat"), Some(("stat".into(), String::new())));
        assert_eq!(parse_command("/"), None);
        assert_eq!(parse_command("stat"), None);
    }

    #[test]
    fn bot_id_is_token_prefix() {
        assert_eq!(bot_id_from_token("123456:ABC-def"), Some(123456));
        assert_eq!(bot_id_from_token("no-colon"), None);
        assert_eq!(bot_id_from_token("abc:def"), None);
    }
}
