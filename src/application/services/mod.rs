//! # Application Services
//!
//! Resilience building blocks (circuit breaker, rate limiter, retry policy,
//! the resilient adapter composing them), the fee and net-output calculator,
//! and quote ranking.

pub mod circuit_breaker;
pub mod fee_calculator;
pub mod ranking;
pub mod rate_limit;
pub mod resilience;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitSnapshot, CircuitState};
pub use fee_calculator::{FeeCalculator, NetOutput};
pub use ranking::{rank_quotes, RankedQuote};
pub use rate_limit::RateLimiter;
pub use resilience::{ResilienceConfig, ResilientAdapter};
pub use retry::{RetryPolicy, Retryable};
