//! # Venues
//!
//! The uniform venue contract and its implementations: the adapter trait,
//! error taxonomy, shared HTTP client, registry and concrete DEX adapters.

pub mod dex;
pub mod error;
pub mod http_client;
pub mod registry;
pub mod traits;

pub use error::{VenueError, VenueResult};
pub use registry::{EligibleVenue, VenueDescriptor, VenueRegistry};
pub use traits::QuoteAdapter;
