// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hybrid public-key decryption of SMS payloads.
//!
//! Ciphertext layout: `ephemeral X25519 public key (32) || nonce (12) ||
//! AES-256-GCM sealed bytes`. The AEAD key is HKDF-SHA256 over the X25519
//! shared secret, salted with the ephemeral public key. No associated data.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::hkdf::{HKDF_SHA256, Salt};
use ring::rand::{SecureRandom, SystemRandom};
use smsq_core::{HybridDecrypt, SmsqError};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::{Zeroize, Zeroizing};

const KEY_LEN: usize = 32;
const HKDF_INFO: &[&[u8]] = &[b"smsq hybrid v1"];
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = KEY_LEN + NONCE_LEN;

/// Relay-side decryptor holding the long-lived X25519 secret.
pub struct HybridDecryptor {
    secret: StaticSecret,
}

impl std::fmt::Debug for HybridDecryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridDecryptor").finish_non_exhaustive()
    }
}

impl HybridDecryptor {
    /// Builds a decryptor from raw secret bytes.
    pub fn from_secret_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self {
            secret: StaticSecret::from(bytes),
        }
    }

    /// Generates a fresh secret from the system CSPRNG.
    pub fn generate() -> Result<Self, SmsqError> {
        let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
        SystemRandom::new()
            .fill(&mut bytes[..])
            .map_err(|_| SmsqError::Crypto("failed to generate random key".to_string()))?;
        Ok(Self::from_secret_bytes(*bytes))
    }

    /// Loads the base64-encoded secret stored at `path`.
    pub fn from_key_file(path: &Path) -> Result<Self, SmsqError> {
        let mut content = std::fs::read_to_string(path).map_err(|e| {
            SmsqError::Config(format!("cannot read private key {}: {e}", path.display()))
        })?;
        let decoded = STANDARD.decode(content.trim());
        content.zeroize();
        let mut raw = decoded.map_err(|e| {
            SmsqError::Config(format!("private key {} is not base64: {e}", path.display()))
        })?;
        let result = <[u8; KEY_LEN]>::try_from(raw.as_slice())
            .map(Self::from_secret_bytes)
            .map_err(|_| {
                SmsqError::Config(format!(
                    "private key {} must decode to {KEY_LEN} bytes, got {}",
                    path.display(),
                    raw.len()
                ))
            });
        raw.zeroize();
        result
    }

    /// Base64 of the secret, in the format [`from_key_file`](Self::from_key_file) reads.
    pub fn secret_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(STANDARD.encode(self.secret.to_bytes()))
    }

    /// Public key handed to companion devices.
    pub fn public_key(&self) -> [u8; KEY_LEN] {
        PublicKey::from(&self.secret).to_bytes()
    }
}

impl HybridDecrypt for HybridDecryptor {
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, SmsqError> {
        if ciphertext.len() < HEADER_LEN + TAG_LEN {
            return Err(SmsqError::Crypto(format!(
                "ciphertext too short: {} bytes",
                ciphertext.len()
            )));
        }
        let (ephemeral, rest) = ciphertext.split_at(KEY_LEN);
        let (nonce, sealed) = rest.split_at(NONCE_LEN);

        let ephemeral = public_key_from(ephemeral)?;
        let shared = self.secret.diffie_hellman(&ephemeral);
        if !shared.was_contributory() {
            return Err(SmsqError::Crypto("low-order ephemeral key".to_string()));
        }

        let key = derive_key(ephemeral.as_bytes(), shared.as_bytes())?;
        let nonce = Nonce::try_assume_unique_for_key(nonce)
            .map_err(|_| SmsqError::Crypto("invalid nonce".to_string()))?;

        let mut in_out = sealed.to_vec();
        let plaintext = key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| SmsqError::Crypto("decryption failed".to_string()))?;
        Ok(plaintext.to_vec())
    }
}

/// Encrypts `plaintext` for the holder of `recipient`'s secret.
pub fn seal(recipient: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>, SmsqError> {
    let rng = SystemRandom::new();
    let ephemeral = HybridDecryptor::generate()?;
    let ephemeral_public = ephemeral.public_key();
    let shared = ephemeral
        .secret
        .diffie_hellman(&PublicKey::from(*recipient));
    if !shared.was_contributory() {
        return Err(SmsqError::Crypto("low-order recipient key".to_string()));
    }
    let key = derive_key(&ephemeral_public, shared.as_bytes())?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| SmsqError::Crypto("failed to generate random nonce".to_string()))?;

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::empty(),
        &mut in_out,
    )
    .map_err(|_| SmsqError::Crypto("encryption failed".to_string()))?;

    let mut out = Vec::with_capacity(HEADER_LEN + in_out.len());
    out.extend_from_slice(&ephemeral_public);
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&in_out);
    Ok(out)
}

fn public_key_from(bytes: &[u8]) -> Result<PublicKey, SmsqError> {
    <[u8; KEY_LEN]>::try_from(bytes)
        .map(PublicKey::from)
        .map_err(|_| SmsqError::Crypto("invalid ephemeral key".to_string()))
}

fn derive_key(salt: &[u8], shared: &[u8]) -> Result<LessSafeKey, SmsqError> {
    let prk = Salt::new(HKDF_SHA256, salt).extract(shared);
    let okm = prk
        .expand(HKDF_INFO, &AES_256_GCM)
        .map_err(|_| SmsqError::Crypto("key derivation failed".to_string()))?;
    Ok(LessSafeKey::new(UnboundKey::from(okm)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sealed_payload_opens_with_matching_secret() {
        let relay = HybridDecryptor::generate().unwrap();
        let sealed = seal(&relay.public_key(), b"{\"key\":\"k\"}").unwrap();
        assert_eq!(sealed.len(), HEADER_LEN + 11 + TAG_LEN);
        assert_eq!(relay.decrypt(&sealed).unwrap(), b"{\"key\":\"k\"}");
    }

    #[test]
    fn other_secret_cannot_open() {
        let relay = HybridDecryptor::generate().unwrap();
        let intruder = HybridDecryptor::generate().unwrap();
        let sealed = seal(&relay.public_key(), b"secret").unwrap();
        assert!(intruder.decrypt(&sealed).is_err());
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let relay = HybridDecryptor::generate().unwrap();
        let mut sealed = seal(&relay.public_key(), b"payload").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        assert!(relay.decrypt(&sealed).is_err());
    }

    #[test]
    fn short_ciphertext_is_rejected() {
        let relay = HybridDecryptor::generate().unwrap();
        let err = relay.decrypt(&[0u8; 20]).unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn all_zero_ephemeral_key_is_rejected() {
        let relay = HybridDecryptor::generate().unwrap();
        let err = relay.decrypt(&[0u8; HEADER_LEN + TAG_LEN]).unwrap_err();
        assert!(err.to_string().contains("low-order"));
    }

    #[test]
    fn key_file_round_trips_through_base64() {
        let relay = HybridDecryptor::generate().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", relay.secret_base64().as_str()).unwrap();

        let loaded = HybridDecryptor::from_key_file(file.path()).unwrap();
        assert_eq!(loaded.public_key(), relay.public_key());
    }

    #[test]
    fn key_file_with_wrong_length_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", STANDARD.encode([1u8; 16])).unwrap();
        let err = HybridDecryptor::from_key_file(file.path()).unwrap_err();
        assert!(matches!(err, SmsqError::Config(msg) if msg.contains("32 bytes")));
    }

    #[test]
    fn missing_key_file_is_a_config_error() {
        let err = HybridDecryptor::from_key_file(Path::new("/nonexistent/key")).unwrap_err();
        assert!(matches!(err, SmsqError::Config(_)));
    }
}
