// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics for the smsq relay.
//!
//! Uses the metrics-rs facade with the Prometheus exporter. The gateway's
//! `/metrics` route serves [`PrometheusAdapter::render`].

pub mod recording;

use async_trait::async_trait;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use smsq_core::SmsqError;
use smsq_core::traits::adapter::PluginAdapter;
use smsq_core::types::{AdapterType, HealthStatus};

pub use recording::{
    record_command, record_delivery, record_rollover, set_memory_heap, set_memory_resident,
};

/// Prometheus metrics adapter.
pub struct PrometheusAdapter {
    handle: PrometheusHandle,
}

impl PrometheusAdapter {
    /// Installs the Prometheus recorder globally.
    ///
    /// Only one recorder can be installed per process; a second call fails.
    pub fn new() -> Result<Self, SmsqError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            SmsqError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        recording::register_metrics();

        tracing::info!("prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    /// Wraps an existing handle, e.g. one from a locally scoped recorder.
    pub fn from_handle(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }

    /// Render all collected metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[async_trait]
impl PluginAdapter for PrometheusAdapter {
    fn name(&self) -> &str {
        "prometheus"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Observability
    }

    async fn health_check(&self) -> Result<HealthStatus, SmsqError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SmsqError> {
        Ok(())
    }
}
