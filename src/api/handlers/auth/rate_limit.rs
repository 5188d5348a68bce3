//! Rate limiting primitives for auth flows.
//!
//! Issuance and verification are bounded per identifier/email and per client
//! IP inside a rolling window, independent of the credential store. Limits
//! are process-local; a multi-instance deployment shares them only per
//! instance.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug)]
pub enum RateLimitAction {
    Login,
    VerifyOtp,
    PasswordReset,
}

impl RateLimitAction {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::VerifyOtp => "verify-otp",
            Self::PasswordReset => "password-reset",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

pub trait RateLimiter: Send + Sync {
    fn check_ip(&self, ip: Option<&str>, action: RateLimitAction) -> RateLimitDecision;
    fn check_identifier(&self, identifier: &str, action: RateLimitAction) -> RateLimitDecision;
}

#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check_ip(&self, _ip: Option<&str>, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }

    fn check_identifier(&self, _identifier: &str, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}

/// In-memory sliding window limiter.
///
/// Each check prunes attempts older than the window, then either rejects or
/// records the new attempt.
#[derive(Debug)]
pub struct WindowRateLimiter {
    max_attempts: usize,
    window: Duration,
    attempts: Mutex<HashMap<String, Vec<Instant>>>,
}

impl WindowRateLimiter {
    #[must_use]
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            window,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    fn check(&self, key: String) -> RateLimitDecision {
        let now = Instant::now();
        let mut attempts = match self.attempts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // Drop keys whose attempts all aged out so the map stays bounded.
        attempts.retain(|_, instants| {
            instants.retain(|at| now.duration_since(*at) < self.window);
            !instants.is_empty()
        });

        let entry = attempts.entry(key).or_default();
        if entry.len() >= self.max_attempts {
            return RateLimitDecision::Limited;
        }

        entry.push(now);
        RateLimitDecision::Allowed
    }
}

impl RateLimiter for WindowRateLimiter {
    fn check_ip(&self, ip: Option<&str>, action: RateLimitAction) -> RateLimitDecision {
        // Without a client IP there is nothing to key on.
        ip.map_or(RateLimitDecision::Allowed, |ip| {
            self.check(format!("ip:{}:{ip}", action.as_str()))
        })
    }

    fn check_identifier(&self, identifier: &str, action: RateLimitAction) -> RateLimitDecision {
        self.check(format!("id:{}:{identifier}", action.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_rate_limiter_allows() {
        let limiter = NoopRateLimiter;
        assert_eq!(
            limiter.check_ip(None, RateLimitAction::Login),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_identifier("user@example.com", RateLimitAction::VerifyOtp),
            RateLimitDecision::Allowed
        );
    }

    #[test]
    fn window_limiter_allows_up_to_max() {
        let limiter = WindowRateLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert_eq!(
                limiter.check_identifier("a@x.com", RateLimitAction::Login),
                RateLimitDecision::Allowed
            );
        }
        assert_eq!(
            limiter.check_identifier("a@x.com", RateLimitAction::Login),
            RateLimitDecision::Limited
        );
    }

    #[test]
    fn window_limiter_keys_are_independent() {
        let limiter = WindowRateLimiter::new(1, Duration::from_secs(60));
        assert_eq!(
            limiter.check_identifier("a@x.com", RateLimitAction::Login),
            RateLimitDecision::Allowed
        );
        // Different identifier, different action, and IPs each have their own window.
        assert_eq!(
            limiter.check_identifier("b@x.com", RateLimitAction::Login),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_identifier("a@x.com", RateLimitAction::VerifyOtp),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_ip(Some("1.2.3.4"), RateLimitAction::Login),
            RateLimitDecision::Allowed
        );
    }

    #[test]
    fn window_limiter_allows_after_window_passes() {
        let limiter = WindowRateLimiter::new(1, Duration::from_millis(10));
        assert_eq!(
            limiter.check_identifier("a@x.com", RateLimitAction::Login),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_identifier("a@x.com", RateLimitAction::Login),
            RateLimitDecision::Limited
        );
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(
            limiter.check_identifier("a@x.com", RateLimitAction::Login),
            RateLimitDecision::Allowed
        );
    }

    #[test]
    fn missing_ip_is_not_limited() {
        let limiter = WindowRateLimiter::new(1, Duration::from_secs(60));
        for _ in 0..5 {
            assert_eq!(
                limiter.check_ip(None, RateLimitAction::Login),
                RateLimitDecision::Allowed
            );
        }
    }
}
