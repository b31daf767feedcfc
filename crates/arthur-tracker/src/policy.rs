//! Polling backoff policy.

use std::time::Duration;

/// Controls how [`AsyncJobTracker::wait_until_terminal`](crate::AsyncJobTracker::wait_until_terminal)
/// paces its status queries.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each non-terminal poll.
    pub backoff_multiplier: f64,
    /// Delay cap.
    pub max_delay: Duration,
    /// Total attempts before giving up with a timeout.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(15),
            max_attempts: 40,
        }
    }
}

impl PollPolicy {
    /// Create policy from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            initial_delay: Duration::from_millis(
                std::env::var("POLL_INITIAL_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.initial_delay.as_millis() as u64),
            ),
            backoff_multiplier: std::env::var("POLL_BACKOFF_MULTIPLIER")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.backoff_multiplier),
            max_delay: Duration::from_millis(
                std::env::var("POLL_MAX_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.max_delay.as_millis() as u64),
            ),
            max_attempts: std::env::var("POLL_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_attempts),
        }
    }

    /// Next delay after a backed-off attempt, capped at `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        let scaled = current.mul_f64(self.backoff_multiplier.max(1.0));
        scaled.min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_growth_and_cap() {
        let policy = PollPolicy {
            initial_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(5),
            max_attempts: 10,
        };

        let d1 = policy.next_delay(policy.initial_delay);
        assert_eq!(d1, Duration::from_secs(2));
        let d2 = policy.next_delay(d1);
        assert_eq!(d2, Duration::from_secs(4));
        let d3 = policy.next_delay(d2);
        assert_eq!(d3, Duration::from_secs(5));
        assert_eq!(policy.next_delay(d3), Duration::from_secs(5));
    }

    #[test]
    fn test_multiplier_never_shrinks_delay() {
        let policy = PollPolicy {
            backoff_multiplier: 0.5,
            ..Default::default()
        };
        let next = policy.next_delay(Duration::from_secs(2));
        assert_eq!(next, Duration::from_secs(2));
    }
}
