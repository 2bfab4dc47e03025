// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use smsq_core::types::DeliveryOutcome;
use smsq_crypto::decode_payload;
use smsq_prometheus::record_delivery;
use smsq_telegram::handler::{parse_update, translate_update};
use tracing::{debug, error, warn};

use crate::server::GatewayState;

/// Request body for POST /v1/sms.
#[derive(Debug, Deserialize)]
pub struct SmsRequest {
    /// Base64 of the hybrid-encrypted envelope.
    pub payload: String,
    pub version: i64,
}

/// Response body for the SMS endpoints. Both fields are always present.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SmsResponse {
    pub error: Option<String>,
    pub result: Option<DeliveryOutcome>,
}

impl SmsResponse {
    fn outcome(outcome: DeliveryOutcome) -> Self {
        Self {
            error: None,
            result: Some(outcome),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            result: None,
        }
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

fn reply(status: StatusCode, body: SmsResponse) -> Response {
    (status, Json(body)).into_response()
}

/// POST /v1/sms
///
/// Decrypts the payload, hands the envelope to the relay, and answers with
/// the delivery outcome.
pub async fn post_sms(State(state): State<GatewayState>, body: Bytes) -> Response {
    let request: SmsRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "cannot decode SMS request");
            return reply(StatusCode::BAD_REQUEST, SmsResponse::error(e.to_string()));
        }
    };

    if request.version != 1 {
        warn!(version = request.version, "unsupported request version");
        return reply(
            StatusCode::BAD_REQUEST,
            SmsResponse::error(format!("unsupported version {}", request.version)),
        );
    }

    let envelope = match decode_payload(&request.payload, state.decryptor.as_ref()) {
        Ok(envelope) => envelope,
        Err(e) if e.is_undecryptable() => {
            warn!(error = %e, "payload rejected");
            return reply(StatusCode::BAD_REQUEST, SmsResponse::error(e.to_string()));
        }
        Err(e) => {
            warn!(error = %e, "envelope rejected");
            record_delivery(DeliveryOutcome::BadRequest);
            return reply(
                StatusCode::OK,
                SmsResponse::outcome(DeliveryOutcome::BadRequest),
            );
        }
    };

    match tokio::time::timeout(state.reply_timeout, state.events.deliver(envelope)).await {
        Ok(Ok(outcome)) => reply(StatusCode::OK, SmsResponse::outcome(outcome)),
        Ok(Err(e)) => {
            error!(error = %e, "relay unavailable");
            reply(
                StatusCode::SERVICE_UNAVAILABLE,
                SmsResponse::error(e.to_string()),
            )
        }
        Err(_) => reply(
            StatusCode::GATEWAY_TIMEOUT,
            SmsResponse::error(format!(
                "delivery timeout ({}s)",
                state.reply_timeout.as_secs()
            )),
        ),
    }
}

/// POST /v0/sms
///
/// The first protocol version is retired; every call gets `api_retired`.
pub async fn post_retired() -> Response {
    debug!("retired API call");
    record_delivery(DeliveryOutcome::ApiRetired);
    reply(
        StatusCode::OK,
        SmsResponse::outcome(DeliveryOutcome::ApiRetired),
    )
}

/// POST /{bot_token}
///
/// Accepts every update with 200 so Telegram does not redeliver it. Relevant
/// updates are queued for the relay without waiting for their processing.
pub async fn post_webhook(State(state): State<GatewayState>, body: Bytes) -> StatusCode {
    let update = match parse_update(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "cannot decode webhook update");
            return StatusCode::OK;
        }
    };
    if let Some(chat_update) = translate_update(&update, state.bot_id) {
        if let Err(e) = state.events.chat_update(chat_update).await {
            error!(error = %e, "chat update dropped");
        }
    }
    StatusCode::OK
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let status = if state.events.is_closed() {
        "stopping"
    } else {
        "ok"
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

/// GET /metrics
///
/// Prometheus text format, or 404 when no recorder is installed.
pub async fn get_metrics(State(state): State<GatewayState>) -> Response {
    match &state.health.prometheus_render {
        Some(render) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sms_request_deserializes() {
        let req: SmsRequest = serde_json::from_str(r#"{"payload":"AAAA","version":1}"#).unwrap();
        assert_eq!(req.payload, "AAAA");
        assert_eq!(req.version, 1);
    }

    #[test]
    fn response_keeps_null_fields() {
        let json = serde_json::to_string(&SmsResponse::outcome(DeliveryOutcome::Delivered)).unwrap();
        assert_eq!(json, r#"{"error":null,"result":"delivered"}"#);
        let json = serde_json::to_string(&SmsResponse::error("bad")).unwrap();
        assert_eq!(json, r#"{"error":"bad","result":null}"#);
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"uptime_secs\":42"));
    }
}
