//! Typed failure taxonomy for the auth flows.

use axum::{http::StatusCode, Json};
use tracing::error;

use super::types::StatusResponse;

/// Failures the auth flows can report to a caller.
///
/// No variant is retried automatically; re-issuing a code is a new login or
/// reset request from the caller.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email not found")]
    NotFound,
    #[error("Invalid email/phone or password")]
    InvalidCredentials,
    #[error("Invalid OTP")]
    InvalidOtp,
    #[error("OTP has expired")]
    OtpExpired,
    #[error("Failed to send OTP")]
    DeliveryFailure,
    #[error("Rate limited")]
    RateLimited,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub(super) fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::InvalidOtp | Self::OtpExpired => StatusCode::BAD_REQUEST,
            Self::DeliveryFailure => StatusCode::BAD_GATEWAY,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Map a flow failure to the `{ok:false, message}` wire shape.
///
/// Internal causes are logged here and never shown to the caller.
pub(super) fn auth_error_response(err: &AuthError) -> (StatusCode, Json<StatusResponse>) {
    let message = match err {
        AuthError::Internal(inner) => {
            error!("auth flow failed: {inner}");
            "Internal error".to_string()
        }
        other => other.to_string(),
    };

    (
        err.status(),
        Json(StatusResponse {
            ok: false,
            message,
        }),
    )
}
