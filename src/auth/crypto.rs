//! Digest utilities
//!
//! Password storage is a SHA-256 digest of the plaintext concatenated
//! with a per-account salt, compared by exact constant-time match.
//! Session tokens are digests over account id, phone, client ip, and the
//! login timestamp.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Generate a fresh per-account salt (128 random bits, base64)
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Digest of the plaintext password concatenated with the salt
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Exact match of the presented password's digest against the stored one
pub fn verify_password(presented: &str, salt: &str, stored: &str) -> bool {
    constant_time_str_eq(&hash_password(presented, salt), stored)
}

/// Session token minted at login: a digest over account id, phone,
/// client ip, and the login timestamp
pub fn login_token(account_id: i64, phone: &str, ip: &str, at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(account_id.to_string().as_bytes());
    hasher.update(phone.as_bytes());
    hasher.update(ip.as_bytes());
    hasher.update(at.to_rfc3339().as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Constant-time comparison of two strings
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
