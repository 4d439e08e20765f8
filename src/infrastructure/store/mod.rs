//! # Quote Store
//!
//! In-memory store for quotes returned to callers, backing
//! `build_execution(quote_id)`.
//!
//! Each stored quote remembers the slippage tolerance of the request that
//! produced it, so the router can re-check satisfiability at execution time.
//! Accepting a quote is recorded here, enforcing that exactly one execution
//! descriptor exists per accepted quote. Expired entries are pruned lazily.

use crate::domain::entities::{Quote, SwapRequest};
use crate::domain::value_objects::QuoteId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// A quote plus the request context needed at execution time.
#[derive(Debug, Clone)]
pub struct StoredQuote {
    /// The quote as returned to the caller.
    pub quote: Quote,
    /// Slippage tolerance of the originating request, in per-mille.
    pub slippage_tolerance_pm: u32,
    /// Whether an execution descriptor has been built for this quote.
    pub accepted: bool,
}

/// Thread-safe in-memory quote store.
///
/// # Examples
///
/// ```ignore
/// let store = QuoteStore::new(Duration::from_secs(600));
/// store.insert(&request, quote.clone()).await;
/// let stored = store.get(quote.id()).await;
/// ```
#[derive(Debug, Clone)]
pub struct QuoteStore {
    entries: Arc<RwLock<HashMap<QuoteId, StoredQuote>>>,
    retention: Duration,
}

impl QuoteStore {
    /// Creates a store that retains quotes for the given duration.
    ///
    /// Retention should be at least the execution freshness window; stale
    /// quotes are kept long enough to answer with `StaleQuote` rather than
    /// `QuoteNotFound`.
    #[must_use]
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            retention,
        }
    }

    /// Stores a quote produced for a request.
    pub async fn insert(&self, request: &SwapRequest, quote: Quote) {
        let mut entries = self.entries.write().await;
        Self::prune(&mut entries, self.retention);
        entries.insert(
            quote.id(),
            StoredQuote {
                quote,
                slippage_tolerance_pm: request.slippage_tolerance_pm(),
                accepted: false,
            },
        );
    }

    /// Returns a stored quote.
    pub async fn get(&self, quote_id: QuoteId) -> Option<StoredQuote> {
        let entries = self.entries.read().await;
        entries.get(&quote_id).cloned()
    }

    /// Marks a quote as accepted for execution.
    ///
    /// Returns false if the quote is unknown or already accepted; the caller
    /// maps that to the appropriate router error.
    pub async fn try_accept(&self, quote_id: QuoteId) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&quote_id) {
            Some(entry) if !entry.accepted => {
                entry.accepted = true;
                true
            }
            _ => false,
        }
    }

    /// Returns the number of stored quotes.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    /// Returns true if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops entries past retention. Accepted quotes are kept for status
    /// tracking until they also age out.
    fn prune(entries: &mut HashMap<QuoteId, StoredQuote>, retention: Duration) {
        entries.retain(|_, e| !e.quote.created_at().is_older_than(retention));
    }
}
