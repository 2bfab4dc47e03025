// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key tooling subcommands: `keygen`, `mint-key`, `check-key`.

use std::io::Write;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use smsq_core::SmsqError;
use smsq_crypto::{HybridDecryptor, is_admissible, mint_admissible_key};

/// Writes a new private key to `out` and returns the base64 public key.
///
/// Refuses to replace an existing file unless `force` is set. On unix the
/// file is created with mode 0600.
pub fn keygen(out: &Path, force: bool) -> Result<String, SmsqError> {
    if out.exists() && !force {
        return Err(SmsqError::Config(format!(
            "{} already exists (use --force to overwrite)",
            out.display()
        )));
    }

    let decryptor = HybridDecryptor::generate()?;
    let secret = decryptor.secret_base64();

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let io_err = |e: std::io::Error| SmsqError::Config(format!("cannot write {}: {e}", out.display()));
    let mut file = options.open(out).map_err(io_err)?;
    file.write_all(secret.as_bytes()).map_err(io_err)?;
    file.write_all(b"\n").map_err(io_err)?;

    Ok(STANDARD.encode(decryptor.public_key()))
}

pub fn mint_key() -> String {
    mint_admissible_key()
}

pub fn check_key(key: &str) -> bool {
    is_admissible(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keygen_round_trips_through_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.key");
        let public = keygen(&path, false).unwrap();

        let loaded = HybridDecryptor::from_key_file(&path).unwrap();
        assert_eq!(STANDARD.encode(loaded.public_key()), public);
    }

    #[test]
    fn keygen_keeps_existing_file_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.key");
        let first = keygen(&path, false).unwrap();
        assert!(keygen(&path, false).is_err());

        let second = keygen(&path, true).unwrap();
        assert_ne!(first, second);
    }

    #[cfg(unix)]
    #[test]
    fn keygen_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.key");
        keygen(&path, false).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn minted_keys_pass_the_check() {
        let key = mint_key();
        assert!(check_key(&key));
        assert!(!check_key("key-485"));
    }
}
