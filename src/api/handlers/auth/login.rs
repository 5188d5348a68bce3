//! Login and standalone OTP verification endpoints.
//!
//! `login` validates identifier+password and, on a match, issues the
//! challenge code. `verify_otp` checks a submitted code and consumes it on
//! success, which is what marks the caller authenticated for this request.

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
use super::types::{LoginRequest, StatusResponse, VerifiedResponse, VerifyOtpRequest};
use super::utils::{
    extract_client_ip, normalize_email, normalize_identifier, otp_matches, valid_email,
    verify_password,
};

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted, OTP sent", body = StatusResponse),
        (status = 400, description = "Missing payload or fields", body = String),
        (status = 401, description = "Invalid credentials", body = StatusResponse),
        (status = 429, description = "Rate limited", body = StatusResponse),
        (status = 502, description = "OTP delivery failed", body = StatusResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let identifier = normalize_identifier(&request.identifier);
    if identifier.is_empty() || request.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "Missing identifier or password".to_string(),
        )
            .into_response();
    }

    let client_ip = extract_client_ip(&headers);
    if auth_state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::Login)
        == RateLimitDecision::Limited
    {
        return auth_error_response(&AuthError::RateLimited).into_response();
    }
    // Identifier keys are lowercased so email case cannot widen the budget.
    if auth_state
        .rate_limiter()
        .check_identifier(&identifier.to_lowercase(), RateLimitAction::Login)
        == RateLimitDecision::Limited
    {
        return auth_error_response(&AuthError::RateLimited).into_response();
    }

    match login_flow(&pool, &auth_state, &identifier, &request.password).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => auth_error_response(&err).into_response(),
    }
}

async fn login_flow(
    pool: &PgPool,
    state: &AuthState,
    identifier: &str,
    password: &str,
) -> Result<StatusResponse, AuthError> {
    // Unknown identifier and wrong password are indistinguishable to the caller.
    let record = storage::lookup_by_identifier(pool, identifier)
        .await
        .map_err(AuthError::Internal)?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(password, &record.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }

    otp::issue_otp(pool, state, &record, otp::LOGIN_SUBJECT).await?;

    Ok(StatusResponse {
        ok: true,
        message: "OTP sent successfully".to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/v1/auth/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Code accepted and consumed", body = VerifiedResponse),
        (status = 400, description = "Missing/invalid input or wrong/expired code", body = StatusResponse),
        (status = 404, description = "Unknown email", body = StatusResponse),
        (status = 429, description = "Rate limited", body = StatusResponse)
    ),
    tag = "auth"
)]
pub async fn verify_otp(
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

    match verify_otp_flow(&pool, &email, submitted).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => auth_error_response(&err).into_response(),
    }
}

async fn verify_otp_flow(
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

            // Single use: clear atomically, guarded on the value we just
            // matched so a concurrent re-issue is not consumed by mistake.
            let consumed = storage::consume_otp(pool, record.id, stored)
                .await
                .map_err(AuthError::Internal)?;
            if !consumed {
                return Err(AuthError::InvalidOtp);
            }

            Ok(VerifiedResponse { ok: true })
        }
    }
}
