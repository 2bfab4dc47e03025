// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hybrid decryption capability used by the envelope pipeline.

use crate::error::SmsqError;

/// Decrypts ciphertext produced for the relay's public key.
///
/// Decryption uses no associated data.
pub trait HybridDecrypt: Send + Sync + 'static {
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, SmsqError>;
}
