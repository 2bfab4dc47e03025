// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payload decoding: base64, hybrid decryption, then JSON envelope parsing.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use smsq_core::{HybridDecrypt, SmsEnvelope, SmsqError};
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

/// Why a payload could not be turned into an envelope.
///
/// The gateway answers the first two with a client error, while a payload
/// that decrypts but is not a valid envelope gets a `bad_request` outcome.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload cannot be decrypted: {0}")]
    Decrypt(#[source] SmsqError),

    #[error("envelope is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl EnvelopeError {
    /// `true` when decoding or decryption failed, before any JSON was seen.
    pub fn is_undecryptable(&self) -> bool {
        matches!(self, EnvelopeError::Base64(_) | EnvelopeError::Decrypt(_))
    }
}

/// Decodes a base64 payload into an [`SmsEnvelope`].
///
/// Invalid UTF-8 or lone surrogates in any string field fail JSON parsing and
/// come back as [`EnvelopeError::Malformed`].
pub fn decode_payload(
    payload: &str,
    decryptor: &dyn HybridDecrypt,
) -> Result<SmsEnvelope, EnvelopeError> {
    let ciphertext = STANDARD.decode(payload.trim())?;
    let plaintext = Zeroizing::new(
        decryptor
            .decrypt(&ciphertext)
            .map_err(EnvelopeError::Decrypt)?,
    );
    let envelope: SmsEnvelope = serde_json::from_slice(&plaintext)?;
    debug!(kind = ?envelope.kind, id = envelope.id, "envelope decoded");
    Ok(envelope)
}
