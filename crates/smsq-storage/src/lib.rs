// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite record store for the smsq relay.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single
//! background connection via `tokio-rusqlite`, and typed query modules for
//! subscriber accounts, the rollover clock, and operator feedback.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStore;
pub use database::Database;
