//! Challenge code generation, persistence, and delivery.

use rand::Rng;
use sqlx::PgPool;
use tracing::{error, info};

use crate::api::email::EmailMessage;

use super::error::AuthError;
use super::state::AuthState;
use super::storage::{self, CredentialRecord};

pub(super) const LOGIN_SUBJECT: &str = "Your OTP Code";
pub(super) const RESET_SUBJECT: &str = "Password Reset OTP";

/// Generate a 6-digit decimal code, uniform over 100000-999999.
pub(super) fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

fn otp_body(otp: &str) -> String {
    format!("<p>Your OTP code is: <strong>{otp}</strong></p>")
}

/// Issue a fresh challenge code for the record and deliver it.
///
/// The code is committed to the store before delivery is attempted, so a
/// failed send leaves a valid stored code behind; the caller re-requests
/// rather than the store rolling back.
pub(super) async fn issue_otp(
    pool: &PgPool,
    state: &AuthState,
    record: &CredentialRecord,
    subject: &str,
) -> Result<(), AuthError> {
    let otp = generate_otp();

    let stored = storage::store_otp(pool, record.id, &otp, state.config().otp_ttl_seconds())
        .await
        .map_err(AuthError::Internal)?;
    if !stored {
        return Err(AuthError::NotFound);
    }

    let message = EmailMessage {
        to_email: record.email.clone(),
        subject: subject.to_string(),
        body_html: otp_body(&otp),
    };

    if let Err(err) = state.email_sender().send(&message).await {
        error!("Failed to deliver OTP to {}: {err}", record.email);
        return Err(AuthError::DeliveryFailure);
    }

    info!("OTP sent to {}", record.email);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{generate_otp, otp_body};

    #[test]
    fn generated_codes_are_six_ascii_digits() {
        for _ in 0..1000 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn generated_codes_stay_in_range() {
        for _ in 0..1000 {
            let otp: u32 = generate_otp().parse().expect("numeric code");
            assert!((100_000..=999_999).contains(&otp));
        }
    }

    #[test]
    fn body_embeds_the_code() {
        let body = otp_body("123456");
        assert_eq!(body, "<p>Your OTP code is: <strong>123456</strong></p>");
    }
}
