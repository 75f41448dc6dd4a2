//! Key derivation and ownership.
//!
//! This module owns two responsibilities:
//! 1. Deriving the session key from a [`DeviceProfile`] using
//!    PBKDF2-HMAC-SHA256.
//! 2. Holding derived key material in a type that is opaque,
//!    non-cloneable, and zeroised on drop.
//!
//! Key material is handled only here and in `envelope`. The derivation
//! logic lives here because it operates on the key itself — not on
//! ciphertexts.
//!
//! ## Derivation structure
//!
//! ```text
//! PBKDF2-HMAC-SHA256(
//!     password   = "{user_agent}{language}{width}x{height}",
//!     salt       = FIXED_SALT,
//!     iterations = 50_000,
//!     out        = 32 bytes
//! )
//! ```
//!
//! Determinism is intentional: the key is never persisted, only
//! re-derived per operation from the same environment. The salt is fixed
//! rather than per-installation, which forfeits PBKDF2's protection
//! against cross-installation precomputation — a known limitation of the
//! scheme, kept for envelope compatibility (see DESIGN.md).

use std::num::NonZeroU32;

use ring::pbkdf2;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::device::DeviceProfile;
use crate::error::MoodvaultError;

/// Size of a derived session key in bytes (256 bits).
pub(crate) const KEY_LEN: usize = 32;

/// PBKDF2 iteration count. Fixed so the same environment always
/// re-derives the identical key.
const ITERATIONS: u32 = 50_000;

/// Fixed derivation salt. Not secret and not per-installation.
const FIXED_SALT: &[u8] = b"music-mood-matcher-session-v1";

/// A key derived from a device profile, usable only for authenticated
/// symmetric encryption and decryption within this crate.
///
/// - Not `Clone`. Derive a fresh one per operation instead.
/// - Zeroised on drop.
/// - Raw bytes never leave the crate: `as_bytes` is `pub(crate)`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct SessionKey {
    bytes: [u8; KEY_LEN],
}

impl SessionKey {
    /// Borrow the raw key bytes for use in encrypt/decrypt operations.
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

/// Derive the session key for a device profile.
///
/// Same profile in, same key out, on every call, across page loads and
/// process restarts. A failure in the underlying primitive propagates as
/// [`MoodvaultError::KeyDerivationFailure`] — never a zero key.
pub(crate) fn derive_session_key(profile: &DeviceProfile) -> Result<SessionKey, MoodvaultError> {
    let iterations =
        NonZeroU32::new(ITERATIONS).ok_or(MoodvaultError::KeyDerivationFailure)?;

    let material = profile.material();
    let mut bytes = [0u8; KEY_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        FIXED_SALT,
        material.as_bytes(),
        &mut bytes,
    );

    Ok(SessionKey { bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> DeviceProfile {
        DeviceProfile::new("Mozilla/5.0 (X11; Linux x86_64)", "en-US", 1920, 1080)
    }

    #[test]
    fn test_derivation_deterministic() {
        let a = derive_session_key(&profile()).unwrap();
        let b = derive_session_key(&profile()).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_profiles_yield_independent_keys() {
        let a = derive_session_key(&profile()).unwrap();
        let mut other = profile();
        other.screen_width = 1280;
        let b = derive_session_key(&other).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_key_is_never_zero() {
        let key = derive_session_key(&profile()).unwrap();
        assert_ne!(key.as_bytes(), &[0u8; KEY_LEN]);
    }
}
