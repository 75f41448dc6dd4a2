//! Authenticated encryption envelopes.
//!
//! An envelope is one opaque string protecting one logical secret:
//! `base64( nonce (12 bytes) ‖ ciphertext ‖ GCM tag (16 bytes) )`.
//!
//! Key material is handled only here and in `keys`. The storage layer
//! performs encryption and decryption exclusively through the functions
//! exposed here.
//!
//! Primitive choices:
//! - **Cipher**: AES-256-GCM (authenticated encryption)
//! - **Nonce**: 96-bit (12 bytes), generated fresh per seal via `SystemRandom`
//! - **Key**: 256-bit, re-derived from the device profile on every call
//!   and discarded afterwards — it is never cached or persisted

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ring::aead::{self, Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::device::DeviceProfile;
use crate::error::MoodvaultError;
use crate::keys::{self, KEY_LEN};

/// The AEAD algorithm used throughout moodvault.
const ALGORITHM: &aead::Algorithm = &AES_256_GCM;

/// Size of the nonce in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// A nonce generated for a single encryption operation.
/// Newtype to prevent accidental reuse — each nonce is consumed on use.
struct OwnedNonce(Nonce);

/// Generate a cryptographically secure random nonce.
///
/// Uses `ring::rand::SystemRandom` — the only source of randomness in the
/// crate. A fresh nonce is generated for every seal. There is no nonce
/// caching or counter-based generation.
fn generate_nonce() -> Result<OwnedNonce, MoodvaultError> {
    let rng = SystemRandom::new();
    let mut buf = [0u8; NONCE_LEN];
    rng.fill(&mut buf)
        .map_err(|_| MoodvaultError::RandomnessFailure)?;
    Ok(OwnedNonce(Nonce::assume_unique_for_key(buf)))
}

fn encrypt(key_bytes: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>, MoodvaultError> {
    let unbound =
        UnboundKey::new(ALGORITHM, key_bytes).map_err(|_| MoodvaultError::InvalidKey)?;
    let key = LessSafeKey::new(unbound);

    let nonce = generate_nonce()?;

    let mut output = Vec::with_capacity(NONCE_LEN + plaintext.len() + ALGORITHM.tag_len());
    output.extend_from_slice(nonce.0.as_ref());
    output.extend_from_slice(plaintext);

    // Encrypts `output[NONCE_LEN..]` in place; the GCM authentication tag
    // comes back separately and is appended last.
    let tag = key
        .seal_in_place_separate_tag(nonce.0, Aad::empty(), &mut output[NONCE_LEN..])
        .map_err(|_| MoodvaultError::EncryptionFailure)?;
    output.extend_from_slice(tag.as_ref());

    Ok(output)
}

fn decrypt(key_bytes: &[u8; KEY_LEN], ciphertext: &[u8]) -> Result<Vec<u8>, MoodvaultError> {
    if ciphertext.len() < NONCE_LEN {
        return Err(MoodvaultError::DecryptionFailure);
    }

    let nonce_bytes: [u8; NONCE_LEN] = ciphertext[..NONCE_LEN]
        .try_into()
        .map_err(|_| MoodvaultError::DecryptionFailure)?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let unbound =
        UnboundKey::new(ALGORITHM, key_bytes).map_err(|_| MoodvaultError::InvalidKey)?;
    let key = LessSafeKey::new(unbound);

    let mut payload = ciphertext[NONCE_LEN..].to_vec();

    let plaintext = key
        .open_in_place(nonce, Aad::empty(), &mut payload)
        .map_err(|_| MoodvaultError::DecryptionFailure)?;

    Ok(plaintext.to_vec())
}

/// Seal a JSON-serializable value into an envelope string.
///
/// The value is serialized to UTF-8 JSON, encrypted under a key freshly
/// derived from `profile`, and returned as a single base64 string in the
/// layout `nonce ‖ ciphertext ‖ tag`. Two seals of the same value yield
/// different envelopes (fresh nonce each call).
pub fn seal<T: Serialize>(
    profile: &DeviceProfile,
    value: &T,
) -> Result<String, MoodvaultError> {
    let plaintext =
        serde_json::to_vec(value).map_err(|_| MoodvaultError::SerializationFailure)?;

    let key = keys::derive_session_key(profile)?;
    let sealed = encrypt(key.as_bytes(), &plaintext)?;

    Ok(BASE64.encode(sealed))
}

/// Open an envelope string back into its value.
///
/// The key is re-derived from `profile` on every call. If the envelope is
/// not valid base64, is truncated, was sealed on a different device
/// profile, or has had any byte altered, the GCM authentication check
/// fails and this returns [`MoodvaultError::DecryptionFailure`]. The
/// caller receives no partial plaintext.
pub fn open<T: DeserializeOwned>(
    profile: &DeviceProfile,
    envelope: &str,
) -> Result<T, MoodvaultError> {
    let sealed = BASE64
        .decode(envelope)
        .map_err(|_| MoodvaultError::DecryptionFailure)?;

    let key = keys::derive_session_key(profile)?;
    let plaintext = decrypt(key.as_bytes(), &sealed)?;

    serde_json::from_slice(&plaintext).map_err(|_| MoodvaultError::SerializationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> DeviceProfile {
        DeviceProfile::new("Mozilla/5.0 (X11; Linux x86_64)", "en-US", 1920, 1080)
    }

    #[test]
    fn test_roundtrip() {
        let token = "eyJhbGciOiJIUzI1NiJ9.demo.sig".to_string();
        let envelope = seal(&profile(), &token).unwrap();
        let opened: String = open(&profile(), &envelope).unwrap();
        assert_eq!(opened, token);
    }

    #[test]
    fn test_fresh_nonce_per_seal() {
        let token = "same-secret".to_string();
        let a = seal(&profile(), &token).unwrap();
        let b = seal(&profile(), &token).unwrap();
        assert_ne!(a, b);
        let opened_a: String = open(&profile(), &a).unwrap();
        let opened_b: String = open(&profile(), &b).unwrap();
        assert_eq!(opened_a, opened_b);
    }

    #[test]
    fn test_malformed_envelope_fails_closed() {
        assert!(open::<String>(&profile(), "not base64 at all!!!").is_err());
        assert!(open::<String>(&profile(), "").is_err());
        // Valid base64, but shorter than a nonce.
        assert!(open::<String>(&profile(), &BASE64.encode(b"tiny")).is_err());
    }
}
