//! Password digests.
//!
//! A credential digest is a fixed-length lowercase-hex SHA-256 over the
//! UTF-8 bytes of the password. It is compared only by exact equality:
//! created at registration, replaced at password reset, re-computed and
//! compared at sign-in.
//!
//! This is obfuscation for transport and comparison, not password-storage
//! protection: the digest is unsalted and fast to compute, so it offers no
//! resistance to offline guessing. An authoritative credential store must
//! use a slow, salted, memory-hard KDF server-side instead.

use ring::digest;

/// Compute the credential digest of a plaintext password.
///
/// Deterministic and pure: the same input always yields the same 64-char
/// lowercase hex string. The empty string is a valid input.
pub fn sha256_hex(plaintext: &str) -> String {
    let d = digest::digest(&digest::SHA256, plaintext.as_bytes());
    hex::encode(d.as_ref())
}

/// Compare a plaintext password against a stored digest.
///
/// Equality of digests is the entire check — passwords are case-sensitive
/// by construction, since any byte difference changes the digest.
pub fn matches(plaintext: &str, stored: &str) -> bool {
    sha256_hex(plaintext) == stored
}
