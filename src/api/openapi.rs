//! OpenAPI document for the served routes.
//!
//! Add new endpoints here so they show up in the generated spec and in the
//! Swagger UI mounted by the server. The `openapi` binary prints the same
//! document for offline tooling.

use utoipa::OpenApi;

use super::handlers::{auth, health};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::login::login,
        auth::login::verify_otp,
        auth::password_reset::request_password_reset,
        auth::password_reset::verify_reset_otp,
        auth::password_reset::commit_password_reset,
    ),
    components(schemas(
        health::Health,
        auth::types::LoginRequest,
        auth::types::VerifyOtpRequest,
        auth::types::PasswordResetRequest,
        auth::types::CommitPasswordRequest,
        auth::types::StatusResponse,
        auth::types::VerifiedResponse,
    )),
    tags(
        (name = "auth", description = "Login, OTP verification, and password reset"),
        (name = "health", description = "Service health")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::openapi;
    use anyhow::{Context, Result};

    #[test]
    fn documents_all_auth_routes() -> Result<()> {
        let doc = serde_json::to_value(openapi())?;
        let paths = doc
            .get("paths")
            .and_then(serde_json::Value::as_object)
            .context("missing paths")?;

        for path in [
            "/health",
            "/v1/auth/login",
            "/v1/auth/verify-otp",
            "/v1/auth/password-reset/request",
            "/v1/auth/password-reset/verify",
            "/v1/auth/password-reset/commit",
        ] {
            assert!(paths.contains_key(path), "missing path {path}");
        }

        Ok(())
    }
}
