// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Envelope decryption and pairing-key tooling for the smsq relay.
//!
//! - [`hybrid`]: X25519 + HKDF-SHA256 + AES-256-GCM decryptor implementing
//!   [`smsq_core::HybridDecrypt`], plus the matching `seal` for tooling.
//! - [`envelope`]: base64 payload to [`smsq_core::SmsEnvelope`] pipeline.
//! - [`admission`]: the double SHA-256 filter on pairing keys.

pub mod admission;
pub mod envelope;
pub mod hybrid;

pub use admission::{KEY_LENGTH, is_admissible, mint_admissible_key};
pub use envelope::{EnvelopeError, decode_payload};
pub use hybrid::{HybridDecryptor, seal};
