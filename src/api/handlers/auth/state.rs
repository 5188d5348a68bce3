//! Auth configuration and shared request state.

use std::sync::Arc;

use crate::api::email::EmailSender;

use super::rate_limit::RateLimiter;

const DEFAULT_OTP_TTL_SECONDS: i64 = 5 * 60;
const DEFAULT_RATE_LIMIT_ATTEMPTS: usize = 5;
const DEFAULT_RATE_LIMIT_WINDOW_SECONDS: u64 = 15 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    otp_ttl_seconds: i64,
    rate_limit_attempts: usize,
    rate_limit_window_seconds: u64,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            otp_ttl_seconds: DEFAULT_OTP_TTL_SECONDS,
            rate_limit_attempts: DEFAULT_RATE_LIMIT_ATTEMPTS,
            rate_limit_window_seconds: DEFAULT_RATE_LIMIT_WINDOW_SECONDS,
        }
    }

    #[must_use]
    pub fn with_otp_ttl_seconds(mut self, seconds: i64) -> Self {
        self.otp_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_rate_limit_attempts(mut self, attempts: usize) -> Self {
        self.rate_limit_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_rate_limit_window_seconds(mut self, seconds: u64) -> Self {
        self.rate_limit_window_seconds = seconds;
        self
    }

    #[must_use]
    pub fn rate_limit_attempts(&self) -> usize {
        self.rate_limit_attempts
    }

    #[must_use]
    pub fn rate_limit_window_seconds(&self) -> u64 {
        self.rate_limit_window_seconds
    }

    pub(super) fn otp_ttl_seconds(&self) -> i64 {
        self.otp_ttl_seconds
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AuthState {
    config: AuthConfig,
    rate_limiter: Arc<dyn RateLimiter>,
    email_sender: Arc<dyn EmailSender>,
}

impl AuthState {
    pub fn new(
        config: AuthConfig,
        rate_limiter: Arc<dyn RateLimiter>,
        email_sender: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            config,
            rate_limiter,
            email_sender,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(super) fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }

    pub(super) fn email_sender(&self) -> &dyn EmailSender {
        self.email_sender.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::super::rate_limit::{NoopRateLimiter, RateLimiter};
    use super::{AuthConfig, AuthState};
    use crate::api::email::LogEmailSender;
    use std::sync::Arc;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new();

        assert_eq!(config.otp_ttl_seconds(), super::DEFAULT_OTP_TTL_SECONDS);
        assert_eq!(
            config.rate_limit_attempts(),
            super::DEFAULT_RATE_LIMIT_ATTEMPTS
        );
        assert_eq!(
            config.rate_limit_window_seconds(),
            super::DEFAULT_RATE_LIMIT_WINDOW_SECONDS
        );

        let config = config
            .with_otp_ttl_seconds(120)
            .with_rate_limit_attempts(3)
            .with_rate_limit_window_seconds(60);

        assert_eq!(config.otp_ttl_seconds(), 120);
        assert_eq!(config.rate_limit_attempts(), 3);
        assert_eq!(config.rate_limit_window_seconds(), 60);
    }

    #[test]
    fn auth_state_exposes_collaborators() {
        let limiter: Arc<dyn RateLimiter> = Arc::new(NoopRateLimiter);
        let state = AuthState::new(AuthConfig::new(), limiter, Arc::new(LogEmailSender));
        assert_eq!(
            state.config().otp_ttl_seconds(),
            super::DEFAULT_OTP_TTL_SECONDS
        );
    }
}
