// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: configuration, key file, on-disk store, relay loop, and
//! gateway wired the way `smsq serve` wires them, with a mock transport in
//! place of Telegram.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use smsq_config::SmsqConfig;
use smsq_core::RecordStore;
use smsq_core::types::ChatId;
use smsq_crypto::{HybridDecryptor, seal};
use smsq_gateway::{GatewayState, HealthState, router};
use smsq_relay::{Relay, RelayPolicy, event_channel};
use smsq_storage::SqliteStore;
use smsq_test_utils::MockTransport;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

const KEY_A: &str = "WEkR1fsxBEyl0CspHrDHHS23PCcXCwKxIl1udQ6p8vVhGAiy0qzaJgBVqL25EgFx";
const TOKEN: &str = "123:ABC";
const ADMIN: i64 = 42;

fn write_config(dir: &Path) -> SmsqConfig {
    let key_path = dir.join("relay.key");
    let db_path = dir.join("smsq.db");
    let decryptor = HybridDecryptor::generate().unwrap();
    std::fs::write(&key_path, decryptor.secret_base64().as_bytes()).unwrap();

    let toml = format!(
        r#"
[server]
webhook_domain = "https://bot.example.com"

[telegram]
bot_token = "{TOKEN}"
admin_id = {ADMIN}

[storage]
database_path = '{}'

[crypto]
private_key_path = '{}'

[limits]
delivered_limit = 2
"#,
        db_path.display(),
        key_path.display()
    );
    let config_path = dir.join("smsq.toml");
    std::fs::write(&config_path, toml).unwrap();
    smsq_config::load_and_validate_from_path(&config_path).unwrap()
}

struct Running {
    app: axum::Router,
    store: Arc<SqliteStore>,
    transport: Arc<MockTransport>,
    decryptor: Arc<HybridDecryptor>,
    cancel: CancellationToken,
    relay_task: tokio::task::JoinHandle<Result<(), smsq_core::SmsqError>>,
}

async fn boot(config: &SmsqConfig) -> Running {
    let decryptor = Arc::new(
        HybridDecryptor::from_key_file(Path::new(&config.crypto.private_key_path)).unwrap(),
    );
    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await.unwrap();
    let transport = Arc::new(MockTransport::new());

    let relay = Relay::new(
        store.clone(),
        transport.clone(),
        RelayPolicy::from_config(config),
    );
    let (events, event_loop) = event_channel(relay, 16);
    let cancel = CancellationToken::new();
    let relay_task = tokio::spawn(event_loop.run(cancel.clone()));

    let state = GatewayState {
        events,
        decryptor: decryptor.clone(),
        bot_id: 123,
        reply_timeout: Duration::from_secs(config.server.reply_timeout_secs),
        health: HealthState {
            start_time: Instant::now(),
            prometheus_render: None,
        },
    };
    Running {
        app: router(state, &config.telegram.bot_token),
        store,
        transport,
        decryptor,
        cancel,
        relay_task,
    }
}

impl Running {
    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn command(&self, chat_id: i64, text: &str) {
        let update = json!({
            "update_id": 1,
            "message": {
                "message_id": 1,
                "date": 1700000000i64,
                "chat": { "id": chat_id, "type": "private", "first_name": "T" },
                "from": { "id": chat_id, "is_bot": false, "first_name": "T" },
                "text": text,
            }
        });
        let (status, _) = self.post(&format!("/{TOKEN}"), update).await;
        assert_eq!(status, StatusCode::OK);
    }

    async fn sms(&self, text: &str) -> Value {
        let envelope = json!({"key": KEY_A, "type": "sms", "text": text, "sender": "Bank"});
        let sealed = seal(
            &self.decryptor.public_key(),
            &serde_json::to_vec(&envelope).unwrap(),
        )
        .unwrap();
        let (status, body) = self
            .post(
                "/v1/sms",
                json!({"payload": STANDARD.encode(sealed), "version": 1}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    async fn stop(self) -> (Arc<SqliteStore>, Arc<MockTransport>) {
        self.cancel.cancel();
        self.relay_task.await.unwrap().unwrap();
        self.store.close().await.unwrap();
        (self.store, self.transport)
    }
}

#[tokio::test]
async fn pair_deliver_and_hit_the_daily_limit() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let running = boot(&config).await;

    running.command(7, &format!("/start {KEY_A}")).await;
    assert_eq!(running.sms("one").await["result"], "delivered");
    assert_eq!(running.sms("two").await["result"], "delivered");
    assert_eq!(running.sms("three").await["result"], "rate_limited");

    let (_store, transport) = running.stop().await;
    let texts = transport.texts_for(ChatId(7)).await;
    assert_eq!(
        texts.last().map(String::as_str),
        Some("We cannot deliver more than 2 messages a day")
    );
    assert!(transport.was_unregistered().await);
}

#[tokio::test]
async fn state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let first = boot(&config).await;
    first.command(7, &format!("/start {KEY_A}")).await;
    assert_eq!(first.sms("before restart").await["result"], "delivered");
    first.stop().await;

    let second = boot(&config).await;
    assert_eq!(second.sms("after restart").await["result"], "delivered");
    let account = second.store.account(ChatId(7)).await.unwrap().unwrap();
    assert_eq!(account.delivered_total, 2);
    second.stop().await;
}

#[tokio::test]
async fn operator_sees_stats_over_webhook() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let running = boot(&config).await;

    running.command(7, &format!("/start {KEY_A}")).await;
    running.sms("hello").await;
    running.command(ADMIN, "/stat").await;
    // A delivery after the command guarantees the loop has handled it.
    running.sms("flush").await;

    let (_store, transport) = running.stop().await;
    assert_eq!(
        transport.texts_for(ChatId(ADMIN)).await,
        vec!["users: 1\nactive users: 1\nsmses: 1\nsmses today: 1"]
    );
}
