//! # Domain Errors
//!
//! Error types for domain-level validation failures.

mod domain_error;

pub use domain_error::{DomainError, DomainResult};
