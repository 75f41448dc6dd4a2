//! Device fingerprint inputs for key derivation.
//!
//! The derived key is bound to the browser environment, not to a stored
//! secret: the same user-agent, language, and screen dimensions always
//! re-derive the identical key, so nothing key-shaped ever touches
//! storage. The flip side is that an envelope sealed on one device cannot
//! be opened on another.
//!
//! None of these attributes is secret. The fingerprint raises the cost of
//! reading a lifted envelope off another machine; it is not a defense
//! against an attacker running code in the same environment.

/// The environment-observable attributes a key is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Full user-agent string.
    pub user_agent: String,
    /// Primary language tag, e.g. `"en-US"`.
    pub language: String,
    /// Screen width in pixels.
    pub screen_width: u32,
    /// Screen height in pixels.
    pub screen_height: u32,
}

impl DeviceProfile {
    pub fn new(
        user_agent: impl Into<String>,
        language: impl Into<String>,
        screen_width: u32,
        screen_height: u32,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            language: language.into(),
            screen_width,
            screen_height,
        }
    }

    /// The deterministic KDF input: user-agent, language, and screen
    /// dimensions as `"{width}x{height}"`, concatenated in that order.
    pub(crate) fn material(&self) -> String {
        format!(
            "{}{}{}x{}",
            self.user_agent, self.language, self.screen_width, self.screen_height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_layout() {
        let profile = DeviceProfile::new("Mozilla/5.0 (X11)", "en-US", 1920, 1080);
        assert_eq!(profile.material(), "Mozilla/5.0 (X11)en-US1920x1080");
    }

    #[test]
    fn test_material_distinguishes_profiles() {
        let a = DeviceProfile::new("Mozilla/5.0", "en-US", 1920, 1080);
        let b = DeviceProfile::new("Mozilla/5.0", "fr-FR", 1920, 1080);
        assert_ne!(a.material(), b.material());
    }
}
