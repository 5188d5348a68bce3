//! Small helpers for identifier validation and secret handling.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use regex::Regex;
use sha2::{Digest, Sha256};

/// Normalize an email for lookup/uniqueness checks.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalize a login identifier (email or phone); phones keep their case.
pub(super) fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_string()
}

/// Basic email format check on already-normalized input.
pub(super) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Hash a plain password with argon2id. Only the hash is ever stored.
pub(super) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("failed to hash password: {err}"))
}

/// Verify a password against a stored argon2id hash.
pub(super) fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Compare a submitted code against the stored one.
///
/// Digest comparison keeps the equality cost independent of where the two
/// codes first differ.
pub(super) fn otp_matches(submitted: &str, stored: &str) -> bool {
    Sha256::digest(submitted.as_bytes()) == Sha256::digest(stored.as_bytes())
}

/// Extract a client IP for rate limiting from common proxy headers.
pub(super) fn extract_client_ip(headers: &axum::http::HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::http::{HeaderMap, HeaderValue};

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn normalize_identifier_keeps_case() {
        assert_eq!(normalize_identifier(" +15550001 "), "+15550001");
        assert_eq!(normalize_identifier("User@Example.com"), "User@Example.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn password_hash_round_trip() -> Result<()> {
        let hash = hash_password("p1")?;
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("p1", &hash));
        assert!(!verify_password("p2", &hash));
        Ok(())
    }

    #[test]
    fn password_hashes_are_salted() -> Result<()> {
        let first = hash_password("p1")?;
        let second = hash_password("p1")?;
        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn verify_password_rejects_garbage_hash() {
        assert!(!verify_password("p1", "not-a-phc-string"));
    }

    #[test]
    fn otp_matches_exact_only() {
        assert!(otp_matches("123456", "123456"));
        assert!(!otp_matches("123456", "123457"));
        assert!(!otp_matches("123456", "12345"));
        assert!(!otp_matches("", "123456"));
    }

    #[test]
    fn extract_client_ip_prefers_forwarded() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.2.3.4, 5.6.7.8"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("9.9.9.9"));
        assert_eq!(extract_client_ip(&headers), Some("1.2.3.4".to_string()));
    }

    #[test]
    fn extract_client_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("9.9.9.9"));
        assert_eq!(extract_client_ip(&headers), Some("9.9.9.9".to_string()));
    }

    #[test]
    fn extract_client_ip_none_when_missing() {
        let headers = HeaderMap::new();
        assert_eq!(extract_client_ip(&headers), None);
    }
}
