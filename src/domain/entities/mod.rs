//! # Domain Entities
//!
//! Swap requests, quotes and execution descriptors.

pub mod execution;
pub mod quote;
pub mod swap_request;

pub use execution::{ExecutionDescriptor, ExecutionStatus, InvalidTransition};
pub use quote::{Quote, QuoteBuilder, RouteHop, VenueCallData};
pub use swap_request::SwapRequest;
