//! # Atesti (Credential & OTP Authentication)
//!
//! `atesti` authenticates users with an identifier (email or phone) plus
//! password, then challenges them with a time-bound one-time passcode (OTP)
//! delivered out-of-band. It also serves the forgot-password flow: request an
//! OTP by email, optionally verify it, then commit a new password.
//!
//! ## Credential Records
//!
//! One record per user in PostgreSQL: unique email (case-insensitive), unique
//! phone (exact match), an argon2id password hash, and the current OTP with
//! its expiry deadline. Records are provisioned out-of-band; this service
//! never creates or deletes them.
//!
//! ## OTP Semantics
//!
//! - Codes are 6 decimal digits drawn uniformly from 100000-999999.
//! - Issuing a new code always overwrites the previous one.
//! - The code is persisted *before* delivery is attempted, so a delivery
//!   failure never leaves the store unsure whether a challenge is
//!   outstanding; the caller is told to re-request.
//! - A successful 2FA verification consumes the code atomically (single use).
//!   The reset-flow verify step is intentionally advisory and leaves the code
//!   in place so the final commit can still act on it.
//! - The code value travels only through the delivery gateway; it never
//!   appears in a response payload or a log line.
//!
//! ## Abuse Protection
//!
//! Issuance and verification are rate limited per identifier and per client
//! IP with an in-memory sliding window, independent of the credential store.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        // Should be a hex string (full SHA-1 is 40 chars, but could be short)
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
