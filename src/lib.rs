//! # moodvault
//!
//! Client-side credential and session-token protection for the Music
//! Mood Matcher application.
//!
//! Credentials are reduced to comparable digests, passwords are graded
//! against a fixed composition rule set, and the session token is sealed
//! with authenticated encryption under a key re-derived on demand from
//! the device environment. A tiered storage manager routes each data
//! category to the tier that balances persistence against exposure:
//! memory, encrypted per-tab storage, or cleartext persistent storage.
//!
//! ## Public API
//!
//! The public surface of this crate is intentionally narrow. Key
//! derivation is internal: callers hand a [`device::DeviceProfile`] to
//! [`envelope`] or [`store`] and never see key material.

// Module declarations.
pub mod device;
pub mod digest;
pub mod envelope;
pub mod error;
pub(crate) mod keys;
pub mod profile;
pub mod store;
pub mod strength;

pub use device::DeviceProfile;
pub use error::MoodvaultError;
pub use store::SessionStore;
