//! # Circuit Breaker
//!
//! Per-venue failure isolation state machine.
//!
//! # State Machine
//!
//! ```text
//! Closed ──(failures >= threshold)──> Open
//!    ↑                                  │
//!    │                         (recovery timeout elapsed)
//!    │                                  │
//!    │                                  ↓
//!    └──(probe succeeds)──────── HalfOpen
//!                                       │
//!                                 (probe fails)
//!                                       │
//!                                       ↓
//!                         Open, recovery timeout grown
//! ```
//!
//! Exactly one trial call passes through in `HalfOpen`. Every re-open from a
//! failed probe grows the recovery timeout by the configured multiplier, up
//! to a cap; closing resets it. A success in `Closed` after a quiet period
//! decays the rolling failure count so isolated blips do not accumulate
//! toward the threshold.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Calls pass through normally.
    #[default]
    Closed,
    /// Calls are rejected without reaching the venue.
    Open,
    /// One trial call is allowed through.
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Closed => "CLOSED",
            Self::Open => "OPEN",
            Self::HalfOpen => "HALF_OPEN",
        };
        write!(f, "{}", s)
    }
}

/// Rejection returned when the circuit does not admit a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitRejection {
    /// Time until a trial call will be admitted, if known. `None` while a
    /// trial call is already in flight.
    pub retry_in: Option<Duration>,
}

impl fmt::Display for CircuitRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.retry_in {
            Some(d) => write!(f, "circuit open, retry in {}ms", d.as_millis()),
            None => write!(f, "circuit open, trial call in flight"),
        }
    }
}

impl std::error::Error for CircuitRejection {}

/// Configuration for a circuit breaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that trip the circuit.
    pub failure_threshold: u32,
    /// Initial recovery timeout after tripping.
    pub recovery_timeout: Duration,
    /// Cap on the grown recovery timeout.
    pub max_recovery_timeout: Duration,
    /// Growth factor applied when a trial call fails.
    pub backoff_multiplier: f64,
    /// Quiet period after which a success resets the failure count.
    pub failure_decay_after: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            max_recovery_timeout: Duration::from_secs(300),
            backoff_multiplier: 2.0,
            failure_decay_after: Duration::from_secs(60),
        }
    }
}

/// Observable counters for a breaker.
#[derive(Debug, Clone, Serialize)]
pub struct CircuitSnapshot {
    /// Current state.
    pub state: CircuitState,
    /// Rolling failure count.
    pub failure_count: u32,
    /// Milliseconds since the last recorded failure, if any.
    pub last_failure_ms_ago: Option<u64>,
    /// Milliseconds until a trial call will be admitted, when open.
    pub retry_in_ms: Option<u64>,
    /// How many times the circuit has opened.
    pub times_opened: u64,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<Instant>,
    opened_at: Option<Instant>,
    current_recovery_timeout: Duration,
    probe_in_flight: bool,
    times_opened: u64,
}

/// Per-venue circuit breaker.
///
/// # Thread Safety
///
/// State transitions are serialized behind a mutex owned by this instance;
/// venues never share a breaker, so they never contend with each other.
///
/// # Examples
///
/// ```
/// use swap_router::application::services::circuit_breaker::{
///     CircuitBreaker, CircuitBreakerConfig,
/// };
///
/// let breaker = CircuitBreaker::new("0x-aggregator", CircuitBreakerConfig::default());
///
/// if breaker.try_acquire().is_ok() {
///     // call the venue, then:
///     breaker.record_success();
/// }
/// ```
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Creates a breaker in the closed state.
    #[must_use]
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let current_recovery_timeout = config.recovery_timeout;
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure: None,
                opened_at: None,
                current_recovery_timeout,
                probe_in_flight: false,
                times_opened: 0,
            }),
        }
    }

    /// Creates a breaker with default configuration.
    #[must_use]
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::new(name, CircuitBreakerConfig::default())
    }

    /// Returns the breaker's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current state.
    ///
    /// An elapsed recovery timeout is reflected as `HalfOpen` only once a
    /// call actually asks to pass through.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Returns the rolling failure count.
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    /// Asks to admit a call.
    ///
    /// In `Open`, transitions to `HalfOpen` once the recovery timeout has
    /// elapsed and admits the caller as the single trial call.
    ///
    /// # Errors
    ///
    /// Returns a [`CircuitRejection`] while the circuit is open or a trial
    /// call is already in flight.
    pub fn try_acquire(&self) -> Result<(), CircuitRejection> {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                if elapsed >= inner.current_recovery_timeout {
                    inner.state = CircuitState::HalfOpen;
                    inner.probe_in_flight = true;
                    Ok(())
                } else {
                    Err(CircuitRejection {
                        retry_in: Some(inner.current_recovery_timeout - elapsed),
                    })
                }
            }
            CircuitState::HalfOpen => {
                if inner.probe_in_flight {
                    Err(CircuitRejection { retry_in: None })
                } else {
                    inner.probe_in_flight = true;
                    Ok(())
                }
            }
        }
    }

    /// Records a successful call.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => {
                let quiet = inner
                    .last_failure
                    .map(|t| t.elapsed() >= self.config.failure_decay_after)
                    .unwrap_or(true);
                if quiet {
                    inner.failure_count = 0;
                } else {
                    inner.failure_count = inner.failure_count.saturating_sub(1);
                }
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Closed;
                inner.failure_count = 0;
                inner.opened_at = None;
                inner.probe_in_flight = false;
                inner.current_recovery_timeout = self.config.recovery_timeout;
            }
            CircuitState::Open => {}
        }
    }

    /// Records a failed call.
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.last_failure = Some(Instant::now());
        match inner.state {
            CircuitState::Closed => {
                inner.failure_count += 1;
                if inner.failure_count >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                    inner.times_opened += 1;
                }
            }
            CircuitState::HalfOpen => {
                // Failed probe re-opens with a grown recovery timeout.
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                inner.probe_in_flight = false;
                inner.times_opened += 1;
                let grown = inner.current_recovery_timeout.as_millis() as f64
                    * self.config.backoff_multiplier;
                let capped = (self.config.max_recovery_timeout.as_millis() as f64).min(grown);
                inner.current_recovery_timeout = Duration::from_millis(capped as u64);
            }
            CircuitState::Open => {}
        }
    }

    /// Resets to the closed state with cleared counters.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.last_failure = None;
        inner.opened_at = None;
        inner.probe_in_flight = false;
        inner.current_recovery_timeout = self.config.recovery_timeout;
    }

    /// Returns an observability snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CircuitSnapshot {
        let inner = self.lock();
        let retry_in_ms = match inner.state {
            CircuitState::Open => {
                let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                Some(
                    inner
                        .current_recovery_timeout
                        .saturating_sub(elapsed)
                        .as_millis() as u64,
                )
            }
            _ => None,
        };
        CircuitSnapshot {
            state: inner.state,
            failure_count: inner.failure_count,
            last_failure_ms_ago: inner.last_failure.map(|t| t.elapsed().as_millis() as u64),
            retry_in_ms,
            times_opened: inner.times_opened,
        }
    }
}

impl fmt::Display for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        write!(
            f,
            "CircuitBreaker({}: {} failures={})",
            self.name, inner.state, inner.failure_count
        )
    }
}
