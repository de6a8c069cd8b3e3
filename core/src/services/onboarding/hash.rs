//! Challenge token derivation
//!
//! Tokens come from a keyed PRF over (mobile, issuance timestamp):
//! unpredictable without the server secret, deterministic given the
//! inputs, which keeps issuance testable against fixed timestamps.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// 32-character uppercase alphanumeric alphabet. Excludes I, O, 0 and 1,
/// which users confuse when retyping a token into an SMS.
const TOKEN_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Derive a fixed-length challenge token from the mobile number and the
/// issuance timestamp, keyed with the server secret.
pub fn derive_token(
    secret: &str,
    mobile: &str,
    issued_at: DateTime<Utc>,
    length: usize,
) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(mobile.as_bytes());
    mac.update(issued_at.to_rfc3339().as_bytes());
    let digest = mac.finalize().into_bytes();

    digest
        .iter()
        .take(length)
        .map(|byte| TOKEN_ALPHABET[(byte & 0x1f) as usize] as char)
        .collect()
}

/// Check that a token has the expected length and alphabet
pub fn is_valid_token_format(token: &str, expected_length: usize) -> bool {
    token.len() == expected_length
        && token.bytes().all(|b| TOKEN_ALPHABET.contains(&b))
}

/// Hash a submitted PIN with a salt so plaintext secrets never reach the
/// durable store. The (mobile, token) pair makes a deterministic salt, so
/// re-archiving the same event produces the same row.
pub fn hash_pin(pin: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(pin.as_bytes());
    hex::encode(hasher.finalize())
}
