use anyhow::Result;
use clap::{Arg, Command};

pub const ARG_OTP_TTL_SECONDS: &str = "otp-ttl-seconds";
pub const ARG_RATE_LIMIT_ATTEMPTS: &str = "rate-limit-attempts";
pub const ARG_RATE_LIMIT_WINDOW_SECONDS: &str = "rate-limit-window-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_OTP_TTL_SECONDS)
                .long(ARG_OTP_TTL_SECONDS)
                .help("OTP validity window in seconds")
                .env("ATESTI_OTP_TTL_SECONDS")
                .default_value("300")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_RATE_LIMIT_ATTEMPTS)
                .long(ARG_RATE_LIMIT_ATTEMPTS)
                .help("Max OTP issuances/verifications per identifier per window")
                .env("ATESTI_RATE_LIMIT_ATTEMPTS")
                .default_value("5")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new(ARG_RATE_LIMIT_WINDOW_SECONDS)
                .long(ARG_RATE_LIMIT_WINDOW_SECONDS)
                .help("Rolling rate limit window in seconds")
                .env("ATESTI_RATE_LIMIT_WINDOW_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(u64)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub otp_ttl_seconds: i64,
    pub rate_limit_attempts: usize,
    pub rate_limit_window_seconds: u64,
}

impl Options {
    /// Read the OTP/rate-limit options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if a value is missing (clap defaults make this unreachable).
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        Ok(Self {
            otp_ttl_seconds: matches
                .get_one::<i64>(ARG_OTP_TTL_SECONDS)
                .copied()
                .unwrap_or(300),
            rate_limit_attempts: matches
                .get_one::<usize>(ARG_RATE_LIMIT_ATTEMPTS)
                .copied()
                .unwrap_or(5),
            rate_limit_window_seconds: matches
                .get_one::<u64>(ARG_RATE_LIMIT_WINDOW_SECONDS)
                .copied()
                .unwrap_or(900),
        })
    }
}
