//! Request/response types for auth endpoints.
//!
//! The challenge code itself never appears in any response payload; it is
//! only delivered out-of-band.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    /// Email (case-insensitive) or phone (exact match).
    pub identifier: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CommitPasswordRequest {
    pub email: String,
    pub new_password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct StatusResponse {
    pub ok: bool,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifiedResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn login_request_round_trips() -> Result<()> {
        let request = LoginRequest {
            identifier: "a@x.com".to_string(),
            password: "p1".to_string(),
        };
        let value = serde_json::to_value(&request)?;
        let identifier = value
            .get("identifier")
            .and_then(serde_json::Value::as_str)
            .context("missing identifier")?;
        assert_eq!(identifier, "a@x.com");
        let decoded: LoginRequest = serde_json::from_value(value)?;
        assert_eq!(decoded.password, "p1");
        Ok(())
    }

    #[test]
    fn commit_password_request_uses_snake_case() -> Result<()> {
        let value = serde_json::json!({
            "email": "a@x.com",
            "new_password": "newpass",
        });
        let decoded: CommitPasswordRequest = serde_json::from_value(value)?;
        assert_eq!(decoded.new_password, "newpass");
        Ok(())
    }

    #[test]
    fn status_response_round_trips() -> Result<()> {
        let response = StatusResponse {
            ok: true,
            message: "OTP sent successfully".to_string(),
        };
        let value = serde_json::to_value(&response)?;
        assert_eq!(value.get("ok"), Some(&serde_json::Value::Bool(true)));
        let decoded: StatusResponse = serde_json::from_value(value)?;
        assert_eq!(decoded.message, "OTP sent successfully");
        Ok(())
    }
}
