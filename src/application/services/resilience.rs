//! # Resilience Wrapper
//!
//! Per-venue wrapper composing the circuit breaker, outbound rate limiter,
//! hard call timeout and deadline-bounded retry around a
//! [`QuoteAdapter`].
//!
//! One wrapper instance owns one venue's circuit state; venues never share
//! mutable state, so they never contend with each other. The wrapper never
//! blocks the aggregator beyond the caller's budget: every attempt is bounded
//! by `min(call_timeout, remaining budget)` and the retry loop checks the
//! remaining budget before sleeping.

use crate::application::services::circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitSnapshot,
};
use crate::application::services::rate_limit::RateLimiter;
use crate::application::services::retry::{Retryable, RetryPolicy};
use crate::domain::entities::{Quote, SwapRequest};
use crate::domain::value_objects::VenueId;
use crate::infrastructure::venues::error::{VenueError, VenueResult};
use crate::infrastructure::venues::traits::QuoteAdapter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

impl Retryable for VenueError {
    fn is_retryable(&self) -> bool {
        VenueError::is_retryable(self)
    }
}

/// Configuration for a venue's resilience wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Hard upper bound for a single venue call.
    pub call_timeout: Duration,
    /// Circuit breaker parameters.
    pub breaker: CircuitBreakerConfig,
    /// Outbound requests allowed per rate-limit window.
    pub rate_limit: u32,
    /// Rate-limit window duration.
    pub rate_limit_window: Duration,
    /// Maximum retry attempts for transient failures.
    pub max_retries: u32,
    /// Initial retry backoff delay.
    pub retry_initial_delay: Duration,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_millis(2_500),
            breaker: CircuitBreakerConfig::default(),
            rate_limit: 300,
            rate_limit_window: Duration::from_secs(60),
            max_retries: 2,
            retry_initial_delay: Duration::from_millis(100),
        }
    }
}

impl ResilienceConfig {
    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: self.retry_initial_delay,
            ..RetryPolicy::default()
        }
    }
}

/// A venue adapter behind its failure-isolation layer.
///
/// # Examples
///
/// ```ignore
/// let wrapper = ResilientAdapter::new(adapter, &ResilienceConfig::default());
/// let quote = wrapper.quote(&request, Duration::from_secs(3)).await?;
/// ```
#[derive(Debug)]
pub struct ResilientAdapter {
    adapter: Arc<dyn QuoteAdapter>,
    breaker: CircuitBreaker,
    limiter: RateLimiter,
    retry: RetryPolicy,
    call_timeout: Duration,
}

impl ResilientAdapter {
    /// Wraps an adapter with its own breaker, limiter and retry policy.
    #[must_use]
    pub fn new(adapter: Arc<dyn QuoteAdapter>, config: &ResilienceConfig) -> Self {
        let name = adapter.venue_id().to_string();
        Self {
            breaker: CircuitBreaker::new(name, config.breaker.clone()),
            limiter: RateLimiter::new(config.rate_limit, config.rate_limit_window),
            retry: config.retry_policy(),
            call_timeout: config.call_timeout,
            adapter,
        }
    }

    /// Returns the wrapped venue's identifier.
    #[must_use]
    pub fn venue_id(&self) -> &VenueId {
        self.adapter.venue_id()
    }

    /// Returns the circuit breaker for observability.
    #[must_use]
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Returns a snapshot of the venue's circuit state and counters.
    #[must_use]
    pub fn circuit_snapshot(&self) -> CircuitSnapshot {
        self.breaker.snapshot()
    }

    /// Requests a quote within the caller's budget.
    ///
    /// Transient failures are retried with backoff while budget remains.
    /// Timeouts, rate limits and upstream faults count toward the circuit's
    /// failure threshold; `Unsupported` and `CircuitOpen` do not.
    ///
    /// # Errors
    ///
    /// Returns the final [`VenueError`] once retries are exhausted, the
    /// budget has run out, or the failure is not transient.
    pub async fn quote(&self, request: &SwapRequest, budget: Duration) -> VenueResult<Quote> {
        let venue = self.adapter.venue_id().clone();
        let deadline = Instant::now() + budget;
        let mut attempts_made = 0;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(VenueError::timeout(venue, budget.as_millis() as u64));
            }

            let error = match self.attempt(request, remaining).await {
                Ok(quote) => return Ok(quote),
                Err(e) => e,
            };

            if !error.is_retryable() || !self.retry.should_retry(attempts_made) {
                return Err(error);
            }

            let mut delay = self.retry.jittered_delay_for(attempts_made);
            if let VenueError::RateLimited {
                retry_after_ms: Some(ms),
                ..
            } = &error
            {
                delay = delay.max(Duration::from_millis(*ms));
            }
            attempts_made += 1;

            if Instant::now() + delay >= deadline {
                return Err(error);
            }
            debug!(
                venue = %error.venue(),
                attempt = attempts_made,
                delay_ms = delay.as_millis() as u64,
                "retrying venue call"
            );
            sleep(delay).await;
        }
    }

    /// One gated attempt: limiter, breaker, bounded call, outcome recording.
    async fn attempt(&self, request: &SwapRequest, remaining: Duration) -> VenueResult<Quote> {
        let venue = self.adapter.venue_id().clone();

        // Local gates first so derived rejections never touch the breaker.
        self.limiter.try_acquire().map_err(|r| {
            VenueError::rate_limited(venue.clone(), Some(r.retry_after.as_millis() as u64))
        })?;

        self.breaker.try_acquire().map_err(|r| {
            VenueError::circuit_open(venue.clone(), r.retry_in.map(|d| d.as_millis() as u64))
        })?;

        // The breaker admitted the call (possibly as the half-open probe):
        // from here every outcome must be recorded.
        let attempt_timeout = self.call_timeout.min(remaining);
        match timeout(attempt_timeout, self.adapter.quote(request)).await {
            Ok(Ok(quote)) => {
                self.breaker.record_success();
                Ok(quote)
            }
            Ok(Err(error)) => {
                if error.counts_as_failure() {
                    self.breaker.record_failure();
                    warn!(venue = %venue, error = %error, "venue call failed");
                } else {
                    // Unsupported is an expected non-fault; the venue
                    // answered, so the circuit sees a healthy dependency.
                    self.breaker.record_success();
                }
                Err(error)
            }
            Err(_elapsed) => {
                self.breaker.record_failure();
                let error = VenueError::timeout(venue, attempt_timeout.as_millis() as u64);
                warn!(venue = %error.venue(), "venue call timed out");
                Err(error)
            }
        }
    }
}
