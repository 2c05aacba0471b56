use moka::sync::Cache;
use std::time::Duration;
use tracing::{debug, warn};

/// Failed login counter per username.
///
/// An entry lives for `lockout` after the last failure, so a locked account unlocks by itself.
#[derive(Debug, Clone)]
pub struct LoginAttempts {
    failures: Cache<String, u32>,
    max_attempts: u32,
}

impl LoginAttempts {
    #[must_use]
    pub fn new(max_attempts: u32, lockout: Duration, capacity: u64) -> Self {
        let failures = Cache::builder().max_capacity(capacity).time_to_live(lockout).build();
        Self { failures, max_attempts: max_attempts.max(1) }
    }

    #[must_use]
    pub fn is_locked(&self, username: &str) -> bool {
        self.failures.get(username).is_some_and(|count| count >= self.max_attempts)
    }

    /// Counts one more failure and returns the new total.
    pub fn record_failure(&self, username: &str) -> u32 {
        let count = self
            .failures
            .entry(username.to_owned())
            .and_upsert_with(|entry| entry.map_or(1, |e| e.into_value().saturating_add(1)))
            .into_value();

        if count >= self.max_attempts {
            warn!(user = %username, attempts = count, "Account locked after repeated login failures");
        } else {
            debug!(user = %username, attempts = count, "Login failure recorded");
        }
        count
    }

    pub fn reset(&self, username: &str) {
        self.failures.invalidate(username);
    }

    #[must_use]
    pub fn failures(&self, username: &str) -> u32 {
        self.failures.get(username).unwrap_or_default()
    }
}

impl Default for LoginAttempts {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(180), 10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locks_after_max_failures() {
        let attempts = LoginAttempts::default();
        assert!(!attempts.is_locked("admin"));

        assert_eq!(attempts.record_failure("admin"), 1);
        assert_eq!(attempts.record_failure("admin"), 2);
        assert!(!attempts.is_locked("admin"));
        assert_eq!(attempts.record_failure("admin"), 3);
        assert!(attempts.is_locked("admin"));
        assert!(!attempts.is_locked("user"));
    }

    #[test]
    fn reset_clears_the_counter() {
        let attempts = LoginAttempts::default();
        attempts.record_failure("user");
        attempts.reset("user");
        assert_eq!(attempts.failures("user"), 0);
    }

    #[test]
    fn lock_expires_after_lockout() {
        let attempts = LoginAttempts::new(1, Duration::from_millis(50), 16);
        attempts.record_failure("user");
        assert!(attempts.is_locked("user"));

        std::thread::sleep(Duration::from_millis(120));
        assert!(!attempts.is_locked("user"));
    }
}
