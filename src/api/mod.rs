use crate::{
    api::handlers::{auth, health},
    cli::globals::GlobalArgs,
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa_swagger_ui::SwaggerUi;

pub(crate) mod email;
pub mod handlers;
// OpenAPI document wiring lives in openapi.rs.
mod openapi;

pub use email::{EmailMessage, EmailSender};
pub use openapi::openapi;

/// Start the server
///
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    dsn: String,
    globals: &GlobalArgs,
    auth_config: auth::AuthConfig,
) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    // Without a delivery endpoint OTP emails are logged, not sent.
    let email_sender: Arc<dyn email::EmailSender> = match &globals.email_api_url {
        Some(endpoint) => Arc::new(email::HttpEmailSender::new(
            endpoint,
            globals.email_api_key.clone(),
            globals.email_from.clone(),
        )?),
        None => Arc::new(email::LogEmailSender),
    };

    let rate_limiter: Arc<dyn auth::RateLimiter> = Arc::new(auth::WindowRateLimiter::new(
        auth_config.rate_limit_attempts(),
        Duration::from_secs(auth_config.rate_limit_window_seconds()),
    ));
    let auth_state = Arc::new(auth::AuthState::new(
        auth_config,
        rate_limiter,
        email_sender,
    ));

    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi()))
        .route("/health", get(health::health).options(health::health))
        .route("/v1/auth/login", post(auth::login::login))
        .route("/v1/auth/verify-otp", post(auth::login::verify_otp))
        .route(
            "/v1/auth/password-reset/request",
            post(auth::password_reset::request_password_reset),
        )
        .route(
            "/v1/auth/password-reset/verify",
            post(auth::password_reset::verify_reset_otp),
        )
        .route(
            "/v1/auth/password-reset/commit",
            post(auth::password_reset::commit_password_reset),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(auth_state.clone()))
                .layer(Extension(pool.clone())),
        );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
