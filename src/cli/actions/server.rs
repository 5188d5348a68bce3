use crate::{api, cli::globals::GlobalArgs};
use anyhow::Result;
use secrecy::SecretString;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub email_api_url: Option<String>,
    pub email_api_key: Option<String>,
    pub email_from: String,
    pub otp_ttl_seconds: i64,
    pub rate_limit_attempts: usize,
    pub rate_limit_window_seconds: u64,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if the delivery sender cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let mut globals = GlobalArgs::new(args.email_from);
    globals.email_api_url = args.email_api_url;

    if let Some(key) = args.email_api_key {
        globals.set_api_key(SecretString::from(key));
    }

    debug!("Global args: {:?}", globals);

    let auth_config = api::handlers::auth::AuthConfig::new()
        .with_otp_ttl_seconds(args.otp_ttl_seconds)
        .with_rate_limit_attempts(args.rate_limit_attempts)
        .with_rate_limit_window_seconds(args.rate_limit_window_seconds);

    api::new(args.port, args.dsn, &globals, auth_config).await
}
