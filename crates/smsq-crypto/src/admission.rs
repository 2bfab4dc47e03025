// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pairing key admission check.
//!
//! A key is admissible when the double SHA-256 of its bytes starts with
//! twelve zero bits. Minting such a key costs the companion app about 4096
//! hashes, which keeps random guessing of live keys expensive.

use rand::Rng;
use rand::distributions::Alphanumeric;
use sha2::{Digest, Sha256};

/// Length of keys minted by the companion application.
pub const KEY_LENGTH: usize = 64;

/// Returns `true` if `key` passes the admission filter.
pub fn is_admissible(key: &str) -> bool {
    let first = Sha256::digest(key.as_bytes());
    let hash = Sha256::digest(first);
    hash[0] == 0 && hash[1] & 0xf0 == 0
}

/// Generates random alphanumeric keys until one is admissible.
pub fn mint_admissible_key() -> String {
    let mut rng = rand::thread_rng();
    loop {
        let key: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(KEY_LENGTH)
            .map(char::from)
            .collect();
        if is_admissible(&key) {
            return key;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_admissible_keys() {
        assert!(is_admissible(
            "WEkR1fsxBEyl0CspHrDHHS23PCcXCwKxIl1udQ6p8vVhGAiy0qzaJgBVqL25EgFx"
        ));
        assert!(is_admissible(
            "kroHIS2GWY4bHhUSPlbzBMhaSbj2tUDoEIA4W3kkiLojMqcLiUrZuO8rhGtJoxpq"
        ));
    }

    #[test]
    fn ordinary_strings_are_rejected() {
        assert!(!is_admissible(""));
        assert!(!is_admissible("hello"));
        assert!(!is_admissible("abc"));
    }

    #[test]
    fn second_byte_high_nibble_must_be_zero() {
        // Double hash starts with 00 f9.
        assert!(!is_admissible("key-485"));
    }

    #[test]
    fn minted_keys_pass() {
        let key = mint_admissible_key();
        assert_eq!(key.len(), KEY_LENGTH);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(is_admissible(&key));
    }
}
