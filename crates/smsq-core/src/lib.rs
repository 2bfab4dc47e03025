// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the smsq relay.
//!
//! This crate provides the trait definitions, error type, and domain types
//! shared by the relay loop and its adapters (transport, record store,
//! hybrid decryption).

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SmsqError;
pub use types::{
    AdapterType, ChatId, ChatUpdate, DeliveryOutcome, HealthStatus, OutboundMessage, ParseMode,
    SmsEnvelope,
};

pub use traits::{ChatTransport, HybridDecrypt, PluginAdapter, RecordStore};
