//! Tiered session storage.
//!
//! Routes each data category through the tier that balances persistence
//! against exposure:
//!
//! - **Profile and roster** (no secret present): cleartext JSON, written
//!   directly and only to the persistent tier.
//! - **Session token**: encrypted into an envelope in the ephemeral
//!   per-tab tier, with the plaintext cached in an in-process map for
//!   fast same-tab reuse. The token is never written to the persistent
//!   tier in any form.
//!
//! Cryptographic and storage errors never cross this boundary: they are
//! logged and converted into "absent" results, so the application above
//! proceeds in a logged-out state rather than crashing. Only the pure
//! validators (`strength`, `digest`) produce user-visible outcomes.
//!
//! Token lifecycle: absent → (login) cached+encrypted → (access)
//! unchanged → (decrypt failure | logout | 401) absent. Token expiry is
//! the issuer's concern; this layer only stores, returns, and erases.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::device::DeviceProfile;
use crate::envelope;
use crate::error::MoodvaultError;
use crate::profile::{RosterEntry, UserProfile};

/// Persistent-tier entry holding the current user's safe subset.
pub const PROFILE_KEY: &str = "musicMoodUser";

/// Persistent-tier entry holding the roster of registered users.
pub const ROSTER_KEY: &str = "musicMoodUsers";

/// Ephemeral-tier entry holding the encrypted session-token envelope.
/// Deliberately short and uninformative.
pub const TOKEN_KEY: &str = "mm_at";

/// A single key-value storage area, in the shape of a web storage object.
///
/// Implementations back this with whatever the host environment offers:
/// persistent storage, per-tab session storage, or plain memory. All
/// operations are fallible — the manager above decides what a failure
/// means for each data category.
pub trait StorageTier {
    fn get(&self, key: &str) -> Result<Option<String>, MoodvaultError>;
    fn put(&mut self, key: &str, value: &str) -> Result<(), MoodvaultError>;
    fn remove(&mut self, key: &str) -> Result<(), MoodvaultError>;
}

/// An in-memory tier. The default backend for tests and for host
/// environments without durable storage.
#[derive(Debug, Default)]
pub struct MemoryTier {
    entries: HashMap<String, String>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageTier for MemoryTier {
    fn get(&self, key: &str) -> Result<Option<String>, MoodvaultError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), MoodvaultError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), MoodvaultError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// The tiered storage manager.
///
/// Explicitly constructed and passed by reference to whatever context
/// needs it — there is no module-level instance. Its lifecycle is the
/// explicit [`bootstrap`](Self::bootstrap) and [`clear`](Self::clear)
/// methods, not an import side effect.
///
/// The embedded caches are the only shared mutable state in the crate,
/// and all mutation goes through these methods.
pub struct SessionStore {
    device: DeviceProfile,
    persistent: Box<dyn StorageTier>,
    ephemeral: Box<dyn StorageTier>,
    /// Plaintext values decrypted this session, keyed by logical name.
    token_cache: HashMap<String, String>,
    /// Warm-started current profile, populated by `bootstrap`.
    current_profile: Option<UserProfile>,
}

impl SessionStore {
    /// Build a store over the given tiers.
    pub fn new(
        device: DeviceProfile,
        persistent: Box<dyn StorageTier>,
        ephemeral: Box<dyn StorageTier>,
    ) -> Self {
        Self {
            device,
            persistent,
            ephemeral,
            token_cache: HashMap::new(),
            current_profile: None,
        }
    }

    /// Build a store over in-memory tiers.
    pub fn in_memory(device: DeviceProfile) -> Self {
        Self::new(
            device,
            Box::new(MemoryTier::new()),
            Box::new(MemoryTier::new()),
        )
    }

    // -----------------------------------------------------------------
    // Session token
    // -----------------------------------------------------------------

    /// Store a freshly issued session token.
    ///
    /// The token is encrypted into the ephemeral tier and simultaneously
    /// cached in plaintext in memory, so same-tab reads skip decryption.
    /// A write failure leaves the previous token erased rather than
    /// half-replaced.
    pub fn set_session_token(&mut self, token: &str) {
        self.token_cache.remove(TOKEN_KEY);
        if let Err(e) = self.ephemeral.remove(TOKEN_KEY) {
            warn!(error = %e, "failed to clear previous token envelope");
        }

        let sealed = match envelope::seal(&self.device, &token.to_string()) {
            Ok(sealed) => sealed,
            Err(e) => {
                warn!(error = %e, "failed to seal session token; token not stored");
                return;
            }
        };
        if let Err(e) = self.ephemeral.put(TOKEN_KEY, &sealed) {
            warn!(error = %e, "failed to write token envelope; token held in memory only");
        }
        self.token_cache
            .insert(TOKEN_KEY.to_string(), token.to_string());
    }

    /// Return the current session token, if any.
    ///
    /// Memory cache first; on a miss, the ephemeral envelope is read,
    /// decrypted with a freshly derived key, and the cache is populated.
    /// A missing envelope, a storage failure, or a failed tag check all
    /// yield `None` — a failed decrypt additionally erases the envelope,
    /// since it can never become readable again.
    pub fn session_token(&mut self) -> Option<String> {
        if let Some(token) = self.token_cache.get(TOKEN_KEY) {
            return Some(token.clone());
        }

        let sealed = match self.ephemeral.get(TOKEN_KEY) {
            Ok(Some(sealed)) => sealed,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "ephemeral tier read failed; treating token as absent");
                return None;
            }
        };

        match envelope::open::<String>(&self.device, &sealed) {
            Ok(token) => {
                self.token_cache
                    .insert(TOKEN_KEY.to_string(), token.clone());
                Some(token)
            }
            Err(e) => {
                warn!(error = %e, "token envelope failed to decrypt; discarding it");
                if let Err(e) = self.ephemeral.remove(TOKEN_KEY) {
                    warn!(error = %e, "failed to remove unreadable token envelope");
                }
                None
            }
        }
    }

    /// The `Authorization` header value for outgoing API requests, if a
    /// token is available.
    pub fn bearer_header(&mut self) -> Option<String> {
        self.session_token().map(|t| format!("Bearer {t}"))
    }

    /// Drop the session token from every tier that holds it.
    ///
    /// This is the 401 path: the API rejected the token, so it is erased
    /// from the memory cache and the ephemeral tier. The persistent
    /// profile is untouched — the user record itself is still valid.
    pub fn invalidate_session_token(&mut self) {
        self.token_cache.remove(TOKEN_KEY);
        if let Err(e) = self.ephemeral.remove(TOKEN_KEY) {
            warn!(error = %e, "failed to remove token envelope during invalidation");
        }
    }

    // -----------------------------------------------------------------
    // Profile and roster (non-sensitive, persistent tier only)
    // -----------------------------------------------------------------

    /// Persist the current user's safe subset as cleartext JSON.
    pub fn save_profile(&mut self, profile: &UserProfile) {
        match serde_json::to_string(profile) {
            Ok(json) => {
                if let Err(e) = self.persistent.put(PROFILE_KEY, &json) {
                    warn!(error = %e, "failed to persist user profile");
                }
                self.current_profile = Some(profile.clone());
            }
            Err(e) => warn!(error = %e, "failed to serialize user profile"),
        }
    }

    /// The current user's profile: the warm cache if bootstrapped, else
    /// a fresh read of the persistent entry. Corrupt or missing JSON is
    /// `None`.
    pub fn profile(&self) -> Option<UserProfile> {
        if let Some(profile) = &self.current_profile {
            return Some(profile.clone());
        }
        self.read_persistent_json(PROFILE_KEY)
    }

    /// Persist the full roster of registered users.
    pub fn save_roster(&mut self, roster: &[RosterEntry]) {
        match serde_json::to_string(roster) {
            Ok(json) => {
                if let Err(e) = self.persistent.put(ROSTER_KEY, &json) {
                    warn!(error = %e, "failed to persist roster");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize roster"),
        }
    }

    /// The roster of registered users. Corrupt or missing JSON is an
    /// empty roster.
    pub fn roster(&self) -> Vec<RosterEntry> {
        self.read_persistent_json(ROSTER_KEY).unwrap_or_default()
    }

    /// Append a sign-in timestamp to a user's login history.
    ///
    /// A user id with no roster entry is a no-op — sign-in proceeds, the
    /// history just is not extended.
    pub fn record_login(&mut self, user_id: &str) {
        let mut roster = self.roster();
        let Some(entry) = roster.iter_mut().find(|e| e.profile.user_id == user_id) else {
            debug!(user_id, "login not recorded: user not in roster");
            return;
        };
        entry.login_history.push(chrono::Utc::now());
        self.save_roster(&roster);
    }

    // -----------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------

    /// Warm-start from the persistent tier at process start.
    ///
    /// Reads the persistent profile entry; if it parses and the user is
    /// verified, the in-process profile cache is seeded. Any read or
    /// parse failure is treated as "no existing session": storage is
    /// reset to empty and the process continues logged out. Never
    /// propagates an error.
    pub fn bootstrap(&mut self) {
        let raw = match self.persistent.get(PROFILE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "persistent tier unreadable at bootstrap; resetting");
                self.clear();
                return;
            }
        };

        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(profile) if profile.is_verified => {
                debug!(user_id = %profile.user_id, "warm-started session from persistent profile");
                self.current_profile = Some(profile);
            }
            Ok(_) => {
                // Unverified records do not warm-start a session.
                self.current_profile = None;
            }
            Err(e) => {
                warn!(error = %e, "persistent profile entry corrupt; resetting");
                self.clear();
            }
        }
    }

    /// Logout: remove the persistent profile entry, the ephemeral token
    /// envelope, and the in-process caches. There is no partial-clear
    /// path — every removal is attempted regardless of earlier failures.
    pub fn clear(&mut self) {
        self.token_cache.clear();
        self.current_profile = None;
        if let Err(e) = self.persistent.remove(PROFILE_KEY) {
            warn!(error = %e, "failed to remove persistent profile entry");
        }
        if let Err(e) = self.ephemeral.remove(TOKEN_KEY) {
            warn!(error = %e, "failed to remove token envelope");
        }
    }

    fn read_persistent_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.persistent.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "persistent tier read failed; treating as absent");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "persistent entry corrupt; treating as absent");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn device() -> DeviceProfile {
        DeviceProfile::new("Mozilla/5.0 (X11; Linux x86_64)", "en-US", 1920, 1080)
    }

    fn verified_profile() -> UserProfile {
        UserProfile {
            email: "ana@example.com".to_string(),
            user_name: "Ana".to_string(),
            gender: "female".to_string(),
            user_id: "u-100".to_string(),
            registered_at: Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap(),
            is_verified: true,
            is_demo: false,
        }
    }

    #[test]
    fn test_token_read_through() {
        let mut store = SessionStore::in_memory(device());
        assert_eq!(store.session_token(), None);

        store.set_session_token("tok-123");
        assert_eq!(store.session_token().as_deref(), Some("tok-123"));

        // Drop the memory cache to force the envelope path.
        store.token_cache.clear();
        assert_eq!(store.session_token().as_deref(), Some("tok-123"));
        // And the cache is repopulated.
        assert!(store.token_cache.contains_key(TOKEN_KEY));
    }

    #[test]
    fn test_envelope_in_ephemeral_tier_is_not_plaintext() {
        let mut store = SessionStore::in_memory(device());
        store.set_session_token("tok-123");
        let stored = store.ephemeral.get(TOKEN_KEY).unwrap().unwrap();
        assert!(!stored.contains("tok-123"));
    }

    #[test]
    fn test_invalidate_removes_cache_and_envelope() {
        let mut store = SessionStore::in_memory(device());
        store.set_session_token("tok-123");
        store.invalidate_session_token();
        assert_eq!(store.session_token(), None);
        assert_eq!(store.ephemeral.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_unreadable_envelope_is_discarded() {
        let mut store = SessionStore::in_memory(device());
        store
            .ephemeral
            .put(TOKEN_KEY, "definitely not an envelope")
            .unwrap();
        assert_eq!(store.session_token(), None);
        assert_eq!(store.ephemeral.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_bearer_header() {
        let mut store = SessionStore::in_memory(device());
        assert_eq!(store.bearer_header(), None);
        store.set_session_token("tok-123");
        assert_eq!(store.bearer_header().as_deref(), Some("Bearer tok-123"));
    }

    #[test]
    fn test_record_login_appends_history() {
        let mut store = SessionStore::in_memory(device());
        store.save_roster(&[RosterEntry {
            profile: verified_profile(),
            login_history: Vec::new(),
        }]);

        store.record_login("u-100");
        store.record_login("u-100");
        store.record_login("u-does-not-exist");

        let roster = store.roster();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].login_history.len(), 2);
    }

    #[test]
    fn test_clear_leaves_nothing_behind() {
        let mut store = SessionStore::in_memory(device());
        store.save_profile(&verified_profile());
        store.set_session_token("tok-123");

        store.clear();

        assert_eq!(store.session_token(), None);
        assert_eq!(store.profile(), None);
        assert_eq!(store.persistent.get(PROFILE_KEY).unwrap(), None);
        assert_eq!(store.ephemeral.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_bootstrap_seeds_verified_profile() {
        let mut store = SessionStore::in_memory(device());
        let json = serde_json::to_string(&verified_profile()).unwrap();
        store.persistent.put(PROFILE_KEY, &json).unwrap();

        store.bootstrap();
        assert_eq!(store.current_profile.as_ref().unwrap().user_id, "u-100");
    }

    #[test]
    fn test_bootstrap_skips_unverified_profile() {
        let mut store = SessionStore::in_memory(device());
        let mut unverified = verified_profile();
        unverified.is_verified = false;
        let json = serde_json::to_string(&unverified).unwrap();
        store.persistent.put(PROFILE_KEY, &json).unwrap();

        store.bootstrap();
        assert_eq!(store.current_profile, None);
    }

    #[test]
    fn test_bootstrap_resets_on_corrupt_entry() {
        let mut store = SessionStore::in_memory(device());
        store.persistent.put(PROFILE_KEY, "{not json").unwrap();

        store.bootstrap();
        assert_eq!(store.current_profile, None);
        assert_eq!(store.persistent.get(PROFILE_KEY).unwrap(), None);
    }
}
