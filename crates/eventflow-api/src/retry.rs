//! Retry policy with exponential backoff and jitter.

use std::time::Duration;

use rand::Rng;

/// Backoff policy applied to retriable request failures.
///
/// Delays grow as `base * 2^attempt`, are jittered upward by up to
/// `jitter` (a ratio, 0.3 = 30%), and are capped at `max_delay`. Jitter is
/// applied before the cap so the cap is a hard bound.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Random upward jitter ratio in `0.0..=1.0`.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            jitter: 0.3,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries; useful in tests and fail-fast callers.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Sets the attempt budget.
    #[must_use]
    pub const fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the base delay.
    #[must_use]
    pub const fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Sets the delay cap.
    #[must_use]
    pub const fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay to sleep after a failed attempt (0-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        let jittered = if self.jitter > 0.0 {
            let factor = 1.0 + rand::thread_rng().gen_range(0.0..=self.jitter);
            exp.mul_f64(factor)
        } else {
            exp
        };
        jittered.min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_and_stay_within_jitter_band() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(60),
            jitter: 0.3,
        };

        for attempt in 0..4 {
            let expected = Duration::from_millis(100 * 2u64.pow(attempt));
            let delay = policy.delay_for(attempt);
            assert!(delay >= expected, "attempt {attempt}: {delay:?} < {expected:?}");
            assert!(
                delay <= expected.mul_f64(1.3),
                "attempt {attempt}: {delay:?} above jitter band"
            );
        }
    }

    #[test]
    fn cap_is_a_hard_bound() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            jitter: 0.3,
        };

        for attempt in 0..10 {
            assert!(policy.delay_for(attempt) <= Duration::from_secs(5));
        }
    }

    #[test]
    fn zero_jitter_is_deterministic() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(10),
            jitter: 0.0,
        };

        assert_eq!(policy.delay_for(0), Duration::from_millis(250));
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_secs(1));
    }
}
