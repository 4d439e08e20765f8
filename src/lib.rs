//! # Swap Router
//!
//! Multi-venue swap quote aggregation and routing engine. Fans a swap request
//! out to independent trading venues (0x, 1inch, ParaSwap), survives slow or
//! failing upstreams through per-venue circuit breaking, rate limiting and
//! bounded timeouts, and ranks the surviving quotes by net output after
//! platform fees and execution cost.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Domain Layer** (`domain`): Tokens and amounts, swap requests, quotes
//!   with their routes, execution descriptors and their invariants
//! - **Application Layer** (`application`): Resilience services (circuit
//!   breaker, rate limiter, retry), fee and net-output calculation, ranking,
//!   the aggregation/routing use cases and the engine context object
//! - **Infrastructure Layer** (`infrastructure`): Venue adapters and their
//!   registry, the shared HTTP client, price reference and quote store
//!
//! ## Example
//!
//! ```rust,ignore
//! use swap_router::application::engine::RoutingEngine;
//! use swap_router::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! let engine = RoutingEngine::from_config(&config).await?;
//!
//! let outcome = engine.get_quotes(&request).await;
//! if let Some(best) = outcome.best() {
//!     let execution = engine.build_execution(best.quote.id()).await?;
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
