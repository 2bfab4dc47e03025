// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `smsq serve` command implementation.
//!
//! Opens the record store, loads the decryption key, registers the Telegram
//! webhook, and runs the relay loop next to the HTTP gateway until a
//! shutdown signal arrives.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use smsq_config::SmsqConfig;
use smsq_core::types::{ChatId, OutboundMessage};
use smsq_core::{ChatTransport, RecordStore, SmsqError};
use smsq_crypto::HybridDecryptor;
use smsq_gateway::{GatewayState, HealthState, router, start_server};
use smsq_prometheus::PrometheusAdapter;
use smsq_relay::{Relay, RelayPolicy, event_channel, install_signal_handler, spawn_ticker};
use smsq_storage::SqliteStore;
use smsq_telegram::TelegramTransport;
use smsq_telegram::handler::bot_id_from_token;
use tracing::{debug, error, info, warn};

/// Pending events the gateway may queue before producers wait.
const EVENT_QUEUE_CAPACITY: usize = 256;

/// Runs the `smsq serve` command.
pub async fn run_serve(config: SmsqConfig) -> Result<(), SmsqError> {
    init_tracing(&config.logging.level);

    info!("starting smsq serve");
    debug!(?config, "effective configuration");

    let bot_id = bot_id_from_token(&config.telegram.bot_token).ok_or_else(|| {
        SmsqError::Config("telegram.bot_token must start with the numeric bot id".to_string())
    })?;

    let decryptor = Arc::new(HybridDecryptor::from_key_file(Path::new(
        &config.crypto.private_key_path,
    ))?);
    info!(path = %config.crypto.private_key_path, "decryption key loaded");

    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;

    let transport = Arc::new(TelegramTransport::new(
        &config.telegram,
        Duration::from_secs(config.server.timeout_secs),
    )?);

    let prometheus = match PrometheusAdapter::new() {
        Ok(adapter) => Some(Arc::new(adapter)),
        Err(e) => {
            warn!(error = %e, "metrics disabled");
            None
        }
    };

    let webhook_url = format!(
        "{}/{}",
        config.server.webhook_domain.trim_end_matches('/'),
        config.telegram.bot_token
    );
    transport.register_webhook(&webhook_url).await?;

    let cancel = install_signal_handler();

    let relay = Relay::new(
        store.clone(),
        transport.clone(),
        RelayPolicy::from_config(&config),
    );
    let (events, event_loop) = event_channel(relay, EVENT_QUEUE_CAPACITY);

    let ticker = spawn_ticker(
        events.clone(),
        Duration::from_secs(config.server.tick_interval_secs),
        cancel.clone(),
    );

    {
        let mem_cancel = cancel.clone();
        tokio::spawn(async move {
            memory_monitor(mem_cancel).await;
        });
    }

    let state = GatewayState {
        events,
        decryptor,
        bot_id,
        reply_timeout: Duration::from_secs(config.server.reply_timeout_secs),
        health: HealthState {
            start_time: Instant::now(),
            prometheus_render: prometheus.map(|p| {
                let render: Arc<dyn Fn() -> String + Send + Sync> = Arc::new(move || p.render());
                render
            }),
        },
    };
    let app = router(state, &config.telegram.bot_token);
    let gateway = {
        let listen_address = config.server.listen_address.clone();
        let gw_cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = start_server(&listen_address, app, gw_cancel.clone()).await {
                error!(error = %e, "gateway failed");
                gw_cancel.cancel();
            }
        })
    };

    let started = OutboundMessage::plain(ChatId(config.telegram.admin_id), "Bot started");
    if let Err(e) = transport.send(started).await {
        warn!(error = %e, "cannot notify operator");
    }

    let result = event_loop.run(cancel.clone()).await;

    cancel.cancel();
    if let Err(e) = ticker.await {
        warn!(error = %e, "ticker task failed");
    }
    if let Err(e) = gateway.await {
        warn!(error = %e, "gateway task failed");
    }
    if let Err(e) = store.close().await {
        warn!(error = %e, "record store did not close cleanly");
    }

    info!("smsq stopped");
    result
}

/// Samples allocator statistics into the memory gauges.
#[cfg(not(target_env = "msvc"))]
async fn memory_monitor(cancel: tokio_util::sync::CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(30));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // Stats are cached until the epoch advances.
                let _ = tikv_jemalloc_ctl::epoch::advance();
                let allocated = tikv_jemalloc_ctl::stats::allocated::read().unwrap_or(0);
                let resident = tikv_jemalloc_ctl::stats::resident::read().unwrap_or(0);
                smsq_prometheus::set_memory_heap(allocated as f64);
                smsq_prometheus::set_memory_resident(resident as f64);
            }
            _ = cancel.cancelled() => {
                debug!("memory monitor shutting down");
                break;
            }
        }
    }
}

#[cfg(target_env = "msvc")]
async fn memory_monitor(cancel: tokio_util::sync::CancellationToken) {
    cancel.cancelled().await;
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("smsq={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
