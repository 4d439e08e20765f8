//! # Outbound Rate Limiter
//!
//! Per-venue fixed-window limiter applied before a call touches the wire.
//!
//! Venues publish request budgets; exceeding them earns real 429s that count
//! against the circuit breaker. The limiter rejects locally first, returning
//! the time until the window resets so the retry policy can wait it out.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Rejection returned when the window budget is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRejection {
    /// Requests allowed per window.
    pub limit: u32,
    /// Time until the current window resets.
    pub retry_after: Duration,
}

impl fmt::Display for RateLimitRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rate limit of {} reached, retry in {}ms",
            self.limit,
            self.retry_after.as_millis()
        )
    }
}

impl std::error::Error for RateLimitRejection {}

#[derive(Debug)]
struct Window {
    started_at: Instant,
    count: u32,
}

/// Fixed-window outbound rate limiter.
///
/// # Examples
///
/// ```
/// use swap_router::application::services::rate_limit::RateLimiter;
/// use std::time::Duration;
///
/// let limiter = RateLimiter::new(2, Duration::from_secs(60));
/// assert!(limiter.try_acquire().is_ok());
/// assert!(limiter.try_acquire().is_ok());
/// assert!(limiter.try_acquire().is_err());
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    state: Mutex<Window>,
}

impl RateLimiter {
    /// Creates a limiter allowing `limit` requests per `window`.
    #[must_use]
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            state: Mutex::new(Window {
                started_at: Instant::now(),
                count: 0,
            }),
        }
    }

    /// Returns the per-window limit.
    #[inline]
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the window duration.
    #[inline]
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    fn lock(&self) -> MutexGuard<'_, Window> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes one slot from the current window.
    ///
    /// # Errors
    ///
    /// Returns a [`RateLimitRejection`] with the time until the window
    /// resets when the budget is exhausted.
    pub fn try_acquire(&self) -> Result<(), RateLimitRejection> {
        let mut window = self.lock();
        let elapsed = window.started_at.elapsed();
        if elapsed >= self.window {
            window.started_at = Instant::now();
            window.count = 0;
        }

        if window.count < self.limit {
            window.count += 1;
            Ok(())
        } else {
            Err(RateLimitRejection {
                limit: self.limit,
                retry_after: self.window.saturating_sub(elapsed),
            })
        }
    }

    /// Returns the number of slots left in the current window.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        let window = self.lock();
        if window.started_at.elapsed() >= self.window {
            self.limit
        } else {
            self.limit.saturating_sub(window.count)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn admits_up_to_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.try_acquire().is_ok());
        assert!(limiter.try_acquire().is_ok());
        assert!(limiter.try_acquire().is_ok());

        let rejection = limiter.try_acquire().unwrap_err();
        assert_eq!(rejection.limit, 3);
        assert!(rejection.retry_after <= Duration::from_secs(60));
    }

    #[test]
    fn window_resets() {
        let limiter = RateLimiter::new(1, Duration::from_millis(50));
        assert!(limiter.try_acquire().is_ok());
        assert!(limiter.try_acquire().is_err());

        thread::sleep(Duration::from_millis(60));
        assert!(limiter.try_acquire().is_ok());
    }

    #[test]
    fn remaining_tracks_usage() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        assert_eq!(limiter.remaining(), 2);
        let _ = limiter.try_acquire();
        assert_eq!(limiter.remaining(), 1);
        let _ = limiter.try_acquire();
        assert_eq!(limiter.remaining(), 0);
    }

    #[test]
    fn rejection_display() {
        let rejection = RateLimitRejection {
            limit: 10,
            retry_after: Duration::from_millis(1_500),
        };
        assert!(rejection.to_string().contains("10"));
        assert!(rejection.to_string().contains("1500ms"));
    }
}
