//! # Use Cases
//!
//! The two inbound operations of the engine: quote aggregation and
//! execution routing.

pub mod build_execution;
pub mod get_quotes;

pub use build_execution::{ExecutionRouter, RouterError};
pub use get_quotes::{
    AggregationCondition, AggregationOutcome, QuoteAggregator, VenueOutcome, VenueOutcomeKind,
};
