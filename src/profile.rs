//! The persisted user record, safe subset only.
//!
//! These are the shapes written to the persistent tier as cleartext JSON.
//! The password digest and any one-time verification code have no field
//! here — they cannot reach durable storage through these types.
//!
//! Field names are camelCase on the wire to match the stored entries
//! (`musicMoodUser`, `musicMoodUsers`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The safe subset of a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    pub user_name: String,
    pub gender: String,
    pub user_id: String,
    pub registered_at: DateTime<Utc>,
    pub is_verified: bool,
    pub is_demo: bool,
}

/// One entry of the registered-users roster: the safe subset plus the
/// sequence of sign-in timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(rename = "loginHistory", default)]
    pub login_history: Vec<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> UserProfile {
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
    fn test_wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        for field in [
            "email",
            "userName",
            "gender",
            "userId",
            "registeredAt",
            "isVerified",
            "isDemo",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        assert!(json.get("passwordDigest").is_none());
    }

    #[test]
    fn test_roster_entry_flattens_profile() {
        let entry = RosterEntry {
            profile: sample(),
            login_history: vec![Utc.with_ymd_and_hms(2025, 3, 15, 8, 0, 0).unwrap()],
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("userName").is_some());
        assert_eq!(json["loginHistory"].as_array().unwrap().len(), 1);

        let back: RosterEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_roster_entry_without_history_deserializes() {
        let json = serde_json::to_value(sample()).unwrap();
        let entry: RosterEntry = serde_json::from_value(json).unwrap();
        assert!(entry.login_history.is_empty());
    }
}
