// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the smsq relay.
//!
//! Decrypts envelopes posted by the companion application, forwards
//! Telegram webhook updates, and serves liveness and metrics endpoints. All
//! state changes go through the relay's [`EventSender`](smsq_relay::EventSender).

pub mod handlers;
pub mod server;

pub use server::{GatewayState, HealthState, router, start_server};
