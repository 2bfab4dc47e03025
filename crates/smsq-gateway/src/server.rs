// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use smsq_core::{HybridDecrypt, SmsqError};
use smsq_relay::EventSender;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Health state for the liveness and metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Optional Prometheus metrics render function.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Producer handle of the relay loop.
    pub events: EventSender,
    /// Decrypts companion payloads.
    pub decryptor: Arc<dyn HybridDecrypt>,
    /// Bot id parsed from the token, used to spot the bot joining a group.
    pub bot_id: u64,
    /// How long an SMS request waits for its outcome.
    pub reply_timeout: Duration,
    pub health: HealthState,
}

/// Builds the gateway router.
///
/// Routes:
/// - POST /v1/sms
/// - POST /v0/sms (retired)
/// - POST /{webhook_path} (Telegram updates; the path is the bot token)
/// - GET /health
/// - GET /metrics
pub fn router(state: GatewayState, webhook_path: &str) -> Router {
    let webhook_route = format!("/{}", webhook_path.trim_start_matches('/'));
    Router::new()
        .route("/v1/sms", post(handlers::post_sms))
        .route("/v0/sms", post(handlers::post_retired))
        .route(&webhook_route, post(handlers::post_webhook))
        .route("/health", get(handlers::get_health))
        .route("/metrics", get(handlers::get_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `listen_address` and serves `app` until `cancel` fires.
pub async fn start_server(
    listen_address: &str,
    app: Router,
    cancel: CancellationToken,
) -> Result<(), SmsqError> {
    let listener = tokio::net::TcpListener::bind(listen_address)
        .await
        .map_err(|e| SmsqError::Transport {
            message: format!("failed to bind gateway to {listen_address}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {listen_address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| SmsqError::Transport {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway stopped");
    Ok(())
}
