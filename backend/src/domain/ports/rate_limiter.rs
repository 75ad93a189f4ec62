//! Port abstraction for request rate limiting.

use std::time::Duration;

/// Budget for one operation: at most `max_requests` per fixed `window`.
///
/// The rule name partitions counters so operations sharing a client key
/// spend independent budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    name: &'static str,
    max_requests: u32,
    window: Duration,
}

impl RateLimitRule {
    /// Define a rule.
    #[must_use]
    pub const fn new(name: &'static str, max_requests: u32, window: Duration) -> Self {
        Self {
            name,
            max_requests,
            window,
        }
    }

    /// Shorthand for per-minute budgets.
    #[must_use]
    pub const fn per_minute(name: &'static str, max_requests: u32) -> Self {
        Self::new(name, max_requests, Duration::from_secs(60))
    }

    /// Counter namespace for this rule.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Requests permitted within one window.
    #[must_use]
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Fixed window length.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }
}

/// Port for rate limiting collaborators.
///
/// Implementations must be safe for concurrent check-and-increment across
/// simultaneous requests; this is the only shared mutable state in the
/// system.
pub trait RateLimiter: Send + Sync {
    /// Record one request for `key` under `rule` and report whether it fits
    /// the budget. Rejected requests are not counted against the window.
    fn try_acquire(&self, rule: &RateLimitRule, key: &str) -> bool;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn per_minute_sets_a_sixty_second_window() {
        let rule = RateLimitRule::per_minute("create_user", 10);
        assert_eq!(rule.name(), "create_user");
        assert_eq!(rule.max_requests(), 10);
        assert_eq!(rule.window(), Duration::from_secs(60));
    }
}
