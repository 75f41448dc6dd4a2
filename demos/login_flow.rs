//! Minimal example: the full sign-up and sign-in flow.
//!
//! Run with: `cargo run --example login_flow`
//!
//! Walks through the pieces end to end:
//! - Strength gate on the chosen password
//! - Credential digest creation and comparison
//! - Session-token storage through the tiered store
//! - Logout wiping every tier

use chrono::Utc;
use moodvault::profile::UserProfile;
use moodvault::strength::{self, Level};
use moodvault::{digest, DeviceProfile, SessionStore};

fn main() {
    // 1. The environment this session runs in. In a browser these come
    // from navigator/screen; here they are fixed for the demo.
    let device = DeviceProfile::new(
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36",
        "en-US",
        1920,
        1080,
    );
    let mut store = SessionStore::in_memory(device);
    store.bootstrap();

    // 2. Registration: gate the password, then digest it.
    let password = "Mood-Matcher1!";
    let verdict = strength::evaluate(password);
    assert_eq!(verdict.level, Level::Strong);
    let registered_digest = digest::sha256_hex(password);
    println!("registered with digest {}…", &registered_digest[..12]);

    store.save_profile(&UserProfile {
        email: "ana@example.com".to_string(),
        user_name: "Ana".to_string(),
        gender: "female".to_string(),
        user_id: "u-100".to_string(),
        registered_at: Utc::now(),
        is_verified: true,
        is_demo: false,
    });

    // 3. Sign-in: recompute and compare.
    assert!(digest::matches("Mood-Matcher1!", &registered_digest));
    assert!(!digest::matches("mood-matcher1!", &registered_digest));
    println!("sign-in accepted, case-variant rejected");

    // 4. The issuer hands back a token; store it.
    store.set_session_token("tok-issued-by-api");
    println!(
        "outgoing requests carry: {}",
        store.bearer_header().unwrap()
    );

    // 5. Logout: nothing survives.
    store.clear();
    assert!(store.session_token().is_none());
    assert!(store.profile().is_none());
    println!("logged out, all tiers empty");
}
