//! Salted password digests. Stored as `base64(salt)$base64(digest)` with
//! digest = SHA-256(salt || password). Verification recomputes and
//! compares in constant time. Stronger KDFs are a drop-in swap behind
//! these two functions.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use constant_time_eq::constant_time_eq;
use rand::RngCore;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

pub fn hash(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = digest_with_salt(&salt, password);
    format!("{}${}", B64.encode(salt), B64.encode(digest))
}

pub fn verify(password: &str, stored: &str) -> bool {
    let Some((salt_b64, digest_b64)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (B64.decode(salt_b64), B64.decode(digest_b64)) else {
        return false;
    };
    let actual = digest_with_salt(&salt, password);
    constant_time_eq(&actual, &expected)
}

fn digest_with_salt(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let stored = hash("hunter22");
        assert!(verify("hunter22", &stored));
        assert!(!verify("hunter23", &stored));
    }

    #[test]
    fn same_password_hashes_differently() {
        assert_ne!(hash("hunter22"), hash("hunter22"));
    }

    #[test]
    fn malformed_stored_value_never_verifies() {
        assert!(!verify("x", "not-a-hash"));
        assert!(!verify("x", "$$"));
    }
}
