//! # Retry Policy
//!
//! Backoff policy for transient venue failures.
//!
//! The policy only computes schedules; the retry loop itself lives in the
//! resilience wrapper, which checks the caller's remaining deadline before
//! every attempt so retries never outlive the request.
//!
//! # Features
//!
//! - Configurable attempts, delays and backoff multiplier
//! - Jitter to prevent thundering-herd retries against a recovering venue
//! - A [`Retryable`] seam so error types declare their own transience

use rand::Rng;
use std::time::Duration;

/// Trait for errors that can indicate whether they are transient.
pub trait Retryable {
    /// Returns true if a fresh attempt could plausibly succeed.
    fn is_retryable(&self) -> bool;
}

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum retry attempts (0 means only the initial attempt).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap on the grown delay.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Jitter factor in `[0, 1]` randomizing each delay downward.
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(2_000),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with custom parameters.
    #[must_use]
    pub fn new(
        max_retries: u32,
        initial_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
        jitter_factor: f64,
    ) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
            backoff_multiplier,
            jitter_factor: jitter_factor.clamp(0.0, 1.0),
        }
    }

    /// Creates a policy that never retries.
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Returns true if another retry is allowed after `attempts_made`.
    #[must_use]
    pub const fn should_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_retries
    }

    /// Returns the backoff delay for a retry attempt (0-indexed).
    ///
    /// `min(initial_delay * multiplier^attempt, max_delay)`
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Returns the backoff delay with jitter applied.
    ///
    /// Jitter shrinks the delay by up to `jitter_factor`, never below 1 ms.
    #[must_use]
    pub fn jittered_delay_for(&self, attempt: u32) -> Duration {
        let base = self.delay_for(attempt);
        if self.jitter_factor <= 0.0 {
            return base;
        }
        let mut rng = rand::rng();
        let jitter: f64 = rng.random();
        let multiplier = 1.0 - (self.jitter_factor * jitter);
        let jittered = base.as_millis() as f64 * multiplier;
        Duration::from_millis(jittered.max(1.0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 2);
        assert!(policy.should_retry(0));
        assert!(policy.should_retry(1));
        assert!(!policy.should_retry(2));
    }

    #[test]
    fn no_retry_policy() {
        let policy = RetryPolicy::no_retry();
        assert!(!policy.should_retry(0));
    }

    #[test]
    fn exponential_delays() {
        let policy = RetryPolicy::new(
            3,
            Duration::from_millis(100),
            Duration::from_millis(10_000),
            2.0,
            0.0,
        );
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
    }

    #[test]
    fn delay_capped() {
        let policy = RetryPolicy::new(
            10,
            Duration::from_millis(100),
            Duration::from_millis(500),
            2.0,
            0.0,
        );
        assert_eq!(policy.delay_for(8), Duration::from_millis(500));
    }

    #[test]
    fn jitter_shrinks_within_bounds() {
        let policy = RetryPolicy::new(
            3,
            Duration::from_millis(1_000),
            Duration::from_millis(10_000),
            2.0,
            0.5,
        );
        for _ in 0..20 {
            let jittered = policy.jittered_delay_for(0);
            assert!(jittered <= Duration::from_millis(1_000));
            assert!(jittered >= Duration::from_millis(500));
        }
    }

    #[test]
    fn zero_jitter_is_deterministic() {
        let policy = RetryPolicy::new(
            3,
            Duration::from_millis(100),
            Duration::from_millis(10_000),
            2.0,
            0.0,
        );
        assert_eq!(policy.jittered_delay_for(1), Duration::from_millis(200));
    }

    #[test]
    fn jitter_factor_clamped() {
        let policy = RetryPolicy::new(
            1,
            Duration::from_millis(100),
            Duration::from_millis(1_000),
            2.0,
            5.0,
        );
        assert!((policy.jitter_factor - 1.0).abs() < f64::EPSILON);
    }
}
