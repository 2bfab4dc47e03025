// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of outbound chat text.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use smsq_core::types::{SmsEnvelope, SmsKind};

/// HTML help shown by `/help`.
pub const HELP_TEXT: &str = "smsq: Receive SMS messages in Telegram\n\
1. Install Android app\n\
2. Open app, start forwarding, connect Telegram\n\
3. Now you receive your SMS messages in this bot!\n\
Project page: https://smsq.me\n\
Source code: https://github.com/igrmk/smsq\n\
\n\
Bot commands:\n\
<b>/help</b> \u{2014} Help\n\
<b>/stop</b> \u{2014} Revoke access\n\
<b>/feedback</b> \u{2014} Send feedback";

/// Escapes the characters Telegram's HTML parse mode treats specially.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&#34;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Device-local wall clock time of the envelope, `YYYY-MM-DD HH:MM:SS`.
///
/// An offset outside +-24h falls back to UTC.
pub fn local_timestamp(timestamp: i64, utc_offset_seconds: i32) -> String {
    let offset = FixedOffset::east_opt(utc_offset_seconds).unwrap_or_else(|| Utc.fix());
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .unwrap_or_default()
        .with_timezone(&offset)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// HTML notification for one envelope.
///
/// Layout: italic timestamp, italic `sender sim` line (the SIM label falls
/// back to the carrier, and the line is omitted when both parts are empty),
/// then the escaped message text.
pub fn notification(envelope: &SmsEnvelope) -> String {
    let mut lines = vec![local_timestamp(
        envelope.timestamp,
        envelope.utc_offset_seconds,
    )];

    let mut sender = escape_html(&envelope.sender);
    let sim = if envelope.sim.is_empty() {
        escape_html(&envelope.carrier)
    } else {
        escape_html(&envelope.sim)
    };
    if !sim.is_empty() {
        sender = format!("{sender} {sim}");
    }
    if !sender.is_empty() {
        lines.push(sender);
    }

    let mut lines: Vec<String> = lines.into_iter().map(|l| format!("<i>{l}</i>")).collect();

    let text = if envelope.kind == SmsKind::IncomingCall && envelope.text.is_empty() {
        "Incoming call".to_string()
    } else {
        escape_html(&envelope.text)
    };
    lines.push(text);
    lines.join("\n")
}

/// Notice sent once when an account reaches its daily limit.
pub fn limit_notice(daily_limit: i64) -> String {
    format!("We cannot deliver more than {daily_limit} messages a day")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope() -> SmsEnvelope {
        SmsEnvelope {
            key: "k".into(),
            text: "Your code is <1234> & more".into(),
            sim: "SIM1".into(),
            carrier: "Carrier".into(),
            sender: "Bank \"X\"".into(),
            timestamp: 1_700_000_000,
            utc_offset_seconds: 3 * 3600,
            ..Default::default()
        }
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(
            escape_html(r#"<a href='x'>"&"</a>"#),
            "&lt;a href=&#39;x&#39;&gt;&#34;&amp;&#34;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn timestamp_applies_device_offset() {
        // 2023-11-14 22:13:20 UTC
        assert_eq!(local_timestamp(1_700_000_000, 0), "2023-11-14 22:13:20");
        assert_eq!(local_timestamp(1_700_000_000, 3 * 3600), "2023-11-15 01:13:20");
        assert_eq!(local_timestamp(1_700_000_000, -5 * 3600), "2023-11-14 17:13:20");
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        assert_eq!(local_timestamp(1_700_000_000, 90_000), "2023-11-14 22:13:20");
    }

    #[test]
    fn notification_layout() {
        assert_eq!(
            notification(&envelope()),
            "<i>2023-11-15 01:13:20</i>\n\
             <i>Bank &#34;X&#34; SIM1</i>\n\
             Your code is &lt;1234&gt; &amp; more"
        );
    }

    #[test]
    fn sim_falls_back_to_carrier() {
        let mut env = envelope();
        env.sim.clear();
        assert!(notification(&env).contains("<i>Bank &#34;X&#34; Carrier</i>"));
    }

    #[test]
    fn sender_line_omitted_when_empty() {
        let mut env = envelope();
        env.sim.clear();
        env.carrier.clear();
        env.sender.clear();
        assert_eq!(notification(&env).lines().count(), 2);
    }

    #[test]
    fn sim_without_sender_keeps_leading_space() {
        let mut env = envelope();
        env.sender.clear();
        assert!(notification(&env).contains("<i> SIM1</i>"));
    }

    #[test]
    fn empty_incoming_call_has_label() {
        let mut env = envelope();
        env.kind = SmsKind::IncomingCall;
        env.text.clear();
        assert!(notification(&env).ends_with("\nIncoming call"));
    }

    #[test]
    fn help_text_uses_html_bold_commands() {
        assert!(HELP_TEXT.starts_with("smsq: Receive SMS messages in Telegram\n"));
        assert!(HELP_TEXT.ends_with("<b>/feedback</b> \u{2014} Send feedback"));
        assert_eq!(HELP_TEXT.lines().count(), 11);
    }
}
