//! # Value Objects
//!
//! Immutable domain value objects: identifiers, timestamps, tokens and
//! fixed-point amounts.

pub mod ids;
pub mod timestamp;
pub mod token;

pub use ids::{ChainId, ExecutionId, QuoteId, VenueId};
pub use timestamp::Timestamp;
pub use token::{Token, TokenAmount};
