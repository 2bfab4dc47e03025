// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for smsq integration tests.
//!
//! Provides a mock chat transport and a relay harness backed by an
//! in-memory SQLite store, so relay behavior can be tested without the
//! Bot API.
//!
//! # Components
//!
//! - [`MockTransport`] - Captures outbound messages and simulates send failures
//! - [`RelayHarness`] - Relay wired to a fresh store and a [`MockTransport`]

pub mod harness;
pub mod mock_transport;

pub use harness::{ADMIN, RelayHarness, RelayHarnessBuilder, envelope};
pub use mock_transport::{MockTransport, SendFailure};
