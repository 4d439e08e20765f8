//! # DEX Aggregator Adapters
//!
//! Concrete [`QuoteAdapter`](crate::infrastructure::venues::traits::QuoteAdapter)
//! implementations over public DEX-aggregator HTTP APIs.

pub mod one_inch;
pub mod paraswap;
pub mod zero_x;

pub use one_inch::{OneInchAdapter, OneInchConfig};
pub use paraswap::{ParaSwapAdapter, ParaSwapConfig};
pub use zero_x::{ZeroXAdapter, ZeroXConfig};
