//! # Venue Registry
//!
//! Static per-venue metadata plus the adapter map.
//!
//! The registry answers the aggregator's eligibility question (active flag and
//! chain support) and hands out the adapter for each eligible venue. It is
//! read-mostly; configuration reload takes a brief exclusive write.
//!
//! # Thread Safety
//!
//! The registry is thread-safe and shared across async tasks as
//! `Arc<VenueRegistry>`.

use crate::domain::entities::SwapRequest;
use crate::domain::value_objects::{ChainId, VenueId};
use crate::infrastructure::venues::traits::QuoteAdapter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Static metadata for a registered venue.
///
/// Lives in the registry; mutated only by configuration reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueDescriptor {
    venue_id: VenueId,
    display_name: String,
    fee_pm: u32,
    chains: Vec<ChainId>,
    active: bool,
    nominal_gas: u64,
}

impl VenueDescriptor {
    /// Creates a new descriptor.
    #[must_use]
    pub fn new(
        venue_id: VenueId,
        display_name: impl Into<String>,
        fee_pm: u32,
        chains: Vec<ChainId>,
    ) -> Self {
        Self {
            venue_id,
            display_name: display_name.into(),
            fee_pm,
            chains,
            active: true,
            nominal_gas: 200_000,
        }
    }

    /// Sets the active flag.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Sets the nominal gas estimate used when a venue reports none.
    #[must_use]
    pub fn with_nominal_gas(mut self, nominal_gas: u64) -> Self {
        self.nominal_gas = nominal_gas;
        self
    }

    /// Returns the venue identifier.
    #[inline]
    #[must_use]
    pub fn venue_id(&self) -> &VenueId {
        &self.venue_id
    }

    /// Returns the display name.
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the venue fee in per-mille.
    #[inline]
    #[must_use]
    pub const fn fee_pm(&self) -> u32 {
        self.fee_pm
    }

    /// Returns the supported chains.
    #[inline]
    #[must_use]
    pub fn chains(&self) -> &[ChainId] {
        &self.chains
    }

    /// Returns the active flag.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the nominal gas estimate.
    #[inline]
    #[must_use]
    pub const fn nominal_gas(&self) -> u64 {
        self.nominal_gas
    }

    /// Returns true if the venue serves both legs of the request.
    #[must_use]
    pub fn supports(&self, request: &SwapRequest) -> bool {
        self.chains.contains(&request.input().chain())
            && self.chains.contains(&request.output().chain())
    }
}

/// Entry pairing a descriptor with its adapter.
struct RegistryEntry {
    descriptor: VenueDescriptor,
    adapter: Arc<dyn QuoteAdapter>,
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

/// An eligible venue: descriptor plus the adapter to call.
#[derive(Debug, Clone)]
pub struct EligibleVenue {
    /// The venue's registry metadata.
    pub descriptor: VenueDescriptor,
    /// The adapter behind this venue.
    pub adapter: Arc<dyn QuoteAdapter>,
}

/// Registry of venue descriptors and adapters.
///
/// # Examples
///
/// ```ignore
/// let registry = VenueRegistry::new();
/// registry.register(descriptor, adapter).await;
///
/// let eligible = registry.eligible_for(&request).await;
/// ```
#[derive(Debug, Default)]
pub struct VenueRegistry {
    entries: RwLock<HashMap<VenueId, RegistryEntry>>,
}

impl VenueRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a venue. An existing entry with the same ID is replaced.
    pub async fn register(&self, descriptor: VenueDescriptor, adapter: Arc<dyn QuoteAdapter>) {
        let venue_id = descriptor.venue_id().clone();
        let mut entries = self.entries.write().await;
        entries.insert(venue_id, RegistryEntry { descriptor, adapter });
    }

    /// Removes a venue. Returns true if it was registered.
    pub async fn unregister(&self, venue_id: &VenueId) -> bool {
        let mut entries = self.entries.write().await;
        entries.remove(venue_id).is_some()
    }

    /// Returns the descriptor for a venue.
    pub async fn descriptor(&self, venue_id: &VenueId) -> Option<VenueDescriptor> {
        let entries = self.entries.read().await;
        entries.get(venue_id).map(|e| e.descriptor.clone())
    }

    /// Returns the adapter for a venue.
    pub async fn adapter(&self, venue_id: &VenueId) -> Option<Arc<dyn QuoteAdapter>> {
        let entries = self.entries.read().await;
        entries.get(venue_id).map(|e| Arc::clone(&e.adapter))
    }

    /// Flips a venue's active flag. Returns true if the venue exists.
    pub async fn set_active(&self, venue_id: &VenueId, active: bool) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(venue_id) {
            Some(entry) => {
                entry.descriptor.active = active;
                true
            }
            None => false,
        }
    }

    /// Replaces a venue's descriptor, keeping its adapter.
    ///
    /// Used by configuration reload. Returns true if the venue exists.
    pub async fn update_descriptor(&self, descriptor: VenueDescriptor) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(descriptor.venue_id()) {
            Some(entry) => {
                entry.descriptor = descriptor;
                true
            }
            None => false,
        }
    }

    /// Returns the venues eligible for a request: active, and supporting the
    /// chains of both legs.
    pub async fn eligible_for(&self, request: &SwapRequest) -> Vec<EligibleVenue> {
        let entries = self.entries.read().await;
        let mut eligible: Vec<EligibleVenue> = entries
            .values()
            .filter(|e| e.descriptor.is_active() && e.descriptor.supports(request))
            .map(|e| EligibleVenue {
                descriptor: e.descriptor.clone(),
                adapter: Arc::clone(&e.adapter),
            })
            .collect();
        // Stable iteration order for deterministic logs and tests.
        eligible.sort_by(|a, b| {
            a.descriptor
                .venue_id()
                .as_str()
                .cmp(b.descriptor.venue_id().as_str())
        });
        eligible
    }

    /// Returns all registered descriptors.
    pub async fn descriptors(&self) -> Vec<VenueDescriptor> {
        let entries = self.entries.read().await;
        entries.values().map(|e| e.descriptor.clone()).collect()
    }

    /// Returns the IDs of all registered venues.
    pub async fn venue_ids(&self) -> Vec<VenueId> {
        let entries = self.entries.read().await;
        entries.keys().cloned().collect()
    }

    /// Returns the number of registered venues.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    /// Returns true if no venues are registered.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
