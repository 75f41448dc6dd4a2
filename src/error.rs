//! Error types for moodvault.
//!
//! Every variant is a distinct failure mode in the credential/token
//! protection layer. Messages are intentionally minimal — they signal
//! *what* failed without revealing *why* in ways that could leak
//! cryptographic state.

use std::fmt;

/// The single error type for all moodvault operations.
#[derive(Debug)]
pub enum MoodvaultError {
    /// A symmetric key was invalid (wrong length, malformed, etc.).
    InvalidKey,

    /// PBKDF2 key derivation failed.
    KeyDerivationFailure,

    /// The system's random number generator failed to produce bytes.
    RandomnessFailure,

    /// Encryption failed. The underlying `ring` operation returned an error.
    EncryptionFailure,

    /// Decryption failed. This includes: wrong device profile, tampered
    /// envelope, truncated or non-base64 input, or a corrupted GCM
    /// authentication tag. Callers must treat this as "no usable secret",
    /// never as partially recovered data.
    DecryptionFailure,

    /// A value could not be serialized to or deserialized from JSON.
    SerializationFailure,

    /// A storage tier read or write failed.
    StorageFailure(String),
}

impl fmt::Display for MoodvaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey => write!(f, "invalid key"),
            Self::KeyDerivationFailure => write!(f, "key derivation failed"),
            Self::RandomnessFailure => write!(f, "randomness source failed"),
            Self::EncryptionFailure => write!(f, "encryption failed"),
            Self::DecryptionFailure => write!(f, "decryption failed"),
            Self::SerializationFailure => write!(f, "serialization failed"),
            Self::StorageFailure(reason) => write!(f, "storage failure: {}", reason),
        }
    }
}

impl std::error::Error for MoodvaultError {}
