// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Async adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod crypto;
pub mod storage;
pub mod transport;

pub use adapter::PluginAdapter;
pub use crypto::HybridDecrypt;
pub use storage::RecordStore;
pub use transport::ChatTransport;
