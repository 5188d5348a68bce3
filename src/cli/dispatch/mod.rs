//! Command-line argument dispatch.
//!
//! Parses validated CLI arguments and maps them to the server action with its
//! full configuration.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, email};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    // Delivery arguments are consistent only in pairs (url + key)
    crate::cli::commands::validate(matches).map_err(|e| anyhow::anyhow!(e))?;

    let email_opts = email::Options::parse(matches)?;
    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        email_api_url: email_opts.api_url,
        email_api_key: email_opts.api_key,
        email_from: email_opts.from_email,
        otp_ttl_seconds: auth_opts.otp_ttl_seconds,
        rate_limit_attempts: auth_opts.rate_limit_attempts,
        rate_limit_window_seconds: auth_opts.rate_limit_window_seconds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::actions::Action;

    #[test]
    fn server_action_carries_defaults() {
        temp_env::with_vars(
            [
                ("ATESTI_DSN", Some("postgres://user@localhost:5432/atesti")),
                ("ATESTI_EMAIL_API_URL", None::<&str>),
                ("ATESTI_EMAIL_API_KEY", None::<&str>),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec!["atesti"]);
                let action = handler(&matches).expect("handler should succeed");
                let Action::Server(args) = action;
                assert_eq!(args.port, 8080);
                assert_eq!(args.dsn, "postgres://user@localhost:5432/atesti");
                assert_eq!(args.otp_ttl_seconds, 300);
                assert_eq!(args.rate_limit_attempts, 5);
                assert_eq!(args.rate_limit_window_seconds, 900);
                assert_eq!(args.email_api_url, None);
                assert_eq!(args.email_from, "no-reply@atesti.dev");
            },
        );
    }

    #[test]
    fn api_url_without_key_rejected() {
        temp_env::with_vars(
            [
                ("ATESTI_DSN", Some("postgres://user@localhost:5432/atesti")),
                (
                    "ATESTI_EMAIL_API_URL",
                    Some("https://api.sendgrid.com/v3/mail/send"),
                ),
                ("ATESTI_EMAIL_API_KEY", None::<&str>),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec!["atesti"]);
                let result = handler(&matches);
                assert!(result.is_err());
                if let Err(err) = result {
                    assert!(err.to_string().contains("--email-api-key"));
                }
            },
        );
    }
}
