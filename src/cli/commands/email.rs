use anyhow::Result;
use clap::{Arg, Command};

pub const ARG_EMAIL_API_URL: &str = "email-api-url";
pub const ARG_EMAIL_API_KEY: &str = "email-api-key";
pub const ARG_EMAIL_FROM: &str = "email-from";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_EMAIL_API_URL)
                .long(ARG_EMAIL_API_URL)
                .help("Email delivery API endpoint (omit to log OTP emails instead of sending)")
                .env("ATESTI_EMAIL_API_URL"),
        )
        .arg(
            Arg::new(ARG_EMAIL_API_KEY)
                .long(ARG_EMAIL_API_KEY)
                .help("Bearer key for the email delivery API")
                .env("ATESTI_EMAIL_API_KEY"),
        )
        .arg(
            Arg::new(ARG_EMAIL_FROM)
                .long(ARG_EMAIL_FROM)
                .help("From address for outbound OTP emails")
                .env("ATESTI_EMAIL_FROM")
                .default_value("no-reply@atesti.dev"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from_email: String,
}

impl Options {
    /// Read the email delivery options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if the from address is missing (clap default makes this unreachable).
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        Ok(Self {
            api_url: matches.get_one::<String>(ARG_EMAIL_API_URL).cloned(),
            api_key: matches.get_one::<String>(ARG_EMAIL_API_KEY).cloned(),
            from_email: matches
                .get_one::<String>(ARG_EMAIL_FROM)
                .cloned()
                .unwrap_or_else(|| "no-reply@atesti.dev".to_string()),
        })
    }
}
