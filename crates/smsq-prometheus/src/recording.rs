// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Recording goes through the metrics-rs facade, so without an installed
//! recorder every helper is a no-op.

use metrics::{describe_counter, describe_gauge};
use smsq_core::types::DeliveryOutcome;

/// Register all smsq metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "smsq_deliveries_total",
        "Delivery attempts by terminal outcome"
    );
    describe_counter!("smsq_commands_total", "Chat commands processed");
    describe_counter!("smsq_rollovers_total", "Daily counter resets applied");
    describe_gauge!("smsq_memory_heap_bytes", "Heap bytes allocated (jemalloc)");
    describe_gauge!(
        "smsq_memory_resident_bytes",
        "Resident bytes mapped by the allocator (jemalloc)"
    );
}

/// Record one delivery outcome.
pub fn record_delivery(outcome: DeliveryOutcome) {
    metrics::counter!("smsq_deliveries_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record a processed chat command.
pub fn record_command(command: &str) {
    metrics::counter!("smsq_commands_total", "command" => command.to_string()).increment(1);
}

pub fn record_rollover() {
    metrics::counter!("smsq_rollovers_total").increment(1);
}

pub fn set_memory_heap(bytes: f64) {
    metrics::gauge!("smsq_memory_heap_bytes").set(bytes);
}

pub fn set_memory_resident(bytes: f64) {
    metrics::gauge!("smsq_memory_resident_bytes").set(bytes);
}
