//! # Execution Routing Use Case
//!
//! Turns an accepted quote into an execution descriptor for an external
//! signer, and applies the status updates the caller reports back.
//!
//! Execution-time checks are the only hard failures the engine surfaces: a
//! stale quote, a quote whose price impact exceeds the requested slippage
//! tolerance, or an out-of-order status transition all represent an unsafe
//! execution attempt.

use crate::domain::entities::execution::{
    ExecutionDescriptor, ExecutionStatus, InvalidTransition,
};
use crate::domain::value_objects::{ExecutionId, QuoteId};
use crate::infrastructure::store::QuoteStore;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, instrument};

/// Execution-time errors surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouterError {
    /// The quote is unknown (never produced, or aged out of retention).
    #[error("quote not found: {0}")]
    QuoteNotFound(QuoteId),

    /// The quote exceeded its freshness window; re-fetch required.
    #[error("quote {quote_id} is stale: {age_ms}ms old, window {window_ms}ms")]
    StaleQuote {
        /// The stale quote.
        quote_id: QuoteId,
        /// The quote's age in milliseconds.
        age_ms: u64,
        /// The freshness window in milliseconds.
        window_ms: u64,
    },

    /// The quote's price impact exceeds the requested slippage tolerance.
    #[error(
        "quote {quote_id} price impact {price_impact_pm}\u{2030} exceeds tolerance {tolerance_pm}\u{2030}"
    )]
    SlippageExceeded {
        /// The offending quote.
        quote_id: QuoteId,
        /// The quote's price impact in per-mille.
        price_impact_pm: u32,
        /// The request's tolerance in per-mille.
        tolerance_pm: u32,
    },

    /// An execution descriptor already exists for this quote.
    #[error("quote {0} already accepted for execution")]
    AlreadyExecuted(QuoteId),

    /// The venue supplied no transaction material for this quote.
    #[error("quote {quote_id} is not executable: {reason}")]
    NotExecutable {
        /// The quote.
        quote_id: QuoteId,
        /// Why no descriptor can be built.
        reason: String,
    },

    /// The execution descriptor is unknown.
    #[error("execution not found: {0}")]
    ExecutionNotFound(ExecutionId),

    /// The requested status update does not move the lifecycle forward.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

/// Builds execution descriptors and tracks their status lifecycle.
///
/// Does not sign or broadcast; the descriptor's target and payload are
/// consumed by an external signer, which reports status back through
/// [`apply_status`](ExecutionRouter::apply_status).
#[derive(Debug)]
pub struct ExecutionRouter {
    store: QuoteStore,
    executions: RwLock<HashMap<ExecutionId, ExecutionDescriptor>>,
    freshness_window: Duration,
}

impl ExecutionRouter {
    /// Creates a router over the quote store.
    #[must_use]
    pub fn new(store: QuoteStore, freshness_window: Duration) -> Self {
        Self {
            store,
            executions: RwLock::new(HashMap::new()),
            freshness_window,
        }
    }

    /// Returns the configured freshness window.
    #[inline]
    #[must_use]
    pub const fn freshness_window(&self) -> Duration {
        self.freshness_window
    }

    /// Builds an execution descriptor for an accepted quote.
    ///
    /// # Errors
    ///
    /// - [`RouterError::QuoteNotFound`] for an unknown quote
    /// - [`RouterError::StaleQuote`] past the freshness window
    /// - [`RouterError::SlippageExceeded`] when price impact breaches the
    ///   request's tolerance
    /// - [`RouterError::NotExecutable`] when the venue supplied no call data
    /// - [`RouterError::AlreadyExecuted`] on a second accept of the same quote
    #[instrument(skip(self))]
    pub async fn build_execution(
        &self,
        quote_id: QuoteId,
    ) -> Result<ExecutionDescriptor, RouterError> {
        let stored = self
            .store
            .get(quote_id)
            .await
            .ok_or(RouterError::QuoteNotFound(quote_id))?;

        if !stored.quote.is_fresh(self.freshness_window) {
            return Err(RouterError::StaleQuote {
                quote_id,
                age_ms: stored.quote.age().as_millis() as u64,
                window_ms: self.freshness_window.as_millis() as u64,
            });
        }

        if stored.quote.price_impact_pm() > stored.slippage_tolerance_pm {
            return Err(RouterError::SlippageExceeded {
                quote_id,
                price_impact_pm: stored.quote.price_impact_pm(),
                tolerance_pm: stored.slippage_tolerance_pm,
            });
        }

        let call_data = stored
            .quote
            .call_data()
            .ok_or_else(|| RouterError::NotExecutable {
                quote_id,
                reason: "venue returned no transaction material".to_string(),
            })?
            .clone();

        // The accept mark is taken last so rejected quotes stay acceptable
        // after a re-fetch; it is atomic, so one descriptor wins a race.
        if !self.store.try_accept(quote_id).await {
            return Err(RouterError::AlreadyExecuted(quote_id));
        }

        let descriptor = ExecutionDescriptor::new(
            quote_id,
            stored.quote.venue_id().clone(),
            call_data.to,
            call_data.payload,
            call_data.value,
            call_data.gas_limit,
        );

        info!(
            execution = %descriptor.id(),
            quote = %quote_id,
            venue = %descriptor.venue_id(),
            "execution descriptor built"
        );

        let mut executions = self.executions.write().await;
        executions.insert(descriptor.id(), descriptor.clone());
        Ok(descriptor)
    }

    /// Applies a caller-reported status update.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::ExecutionNotFound`] for an unknown descriptor
    /// or [`RouterError::InvalidTransition`] for an out-of-order update.
    #[instrument(skip(self))]
    pub async fn apply_status(
        &self,
        execution_id: ExecutionId,
        status: ExecutionStatus,
    ) -> Result<ExecutionDescriptor, RouterError> {
        let mut executions = self.executions.write().await;
        let descriptor = executions
            .get_mut(&execution_id)
            .ok_or(RouterError::ExecutionNotFound(execution_id))?;

        descriptor.transition_to(status)?;
        info!(execution = %execution_id, status = %status, "execution status updated");
        Ok(descriptor.clone())
    }

    /// Returns an execution descriptor by ID.
    pub async fn execution(&self, execution_id: ExecutionId) -> Option<ExecutionDescriptor> {
        let executions = self.executions.read().await;
        executions.get(&execution_id).cloned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::quote::{Quote, VenueCallData};
    use crate::domain::entities::SwapRequest;
    use crate::domain::value_objects::{
        ChainId, Timestamp, Token, TokenAmount, VenueId,
    };

    fn request_with_tolerance(tolerance_pm: u32) -> SwapRequest {
        SwapRequest::new(
            Token::new("WETH", ChainId::ETHEREUM, 18),
            Token::new("USDC", ChainId::ETHEREUM, 6),
            TokenAmount::new(1_000),
            tolerance_pm,
            Duration::from_secs(3),
        )
        .unwrap()
    }

    fn call_data() -> VenueCallData {
        VenueCallData {
            to: "0xdef1c0ded9bec7f1a1670819833240f027b25eff".to_string(),
            payload: "0xabcdef".to_string(),
            value: TokenAmount::ZERO,
            gas_limit: 200_000,
        }
    }

    fn quote_with(price_impact_pm: u32, created_at: Timestamp) -> Quote {
        Quote::builder(
            VenueId::new("0x"),
            TokenAmount::new(1_000),
            TokenAmount::new(990),
        )
        .price_impact_pm(price_impact_pm)
        .call_data(call_data())
        .created_at(created_at)
        .build()
        .unwrap()
    }

    fn router() -> ExecutionRouter {
        ExecutionRouter::new(
            QuoteStore::new(Duration::from_secs(3_600)),
            Duration::from_secs(600),
        )
    }

    #[tokio::test]
    async fn builds_descriptor_for_fresh_quote() {
        let router = router();
        let quote = quote_with(3, Timestamp::now());
        let id = quote.id();
        router
            .store
            .insert(&request_with_tolerance(10), quote)
            .await;

        let descriptor = router.build_execution(id).await.unwrap();
        assert_eq!(descriptor.quote_id(), id);
        assert_eq!(descriptor.to(), call_data().to);
        assert_eq!(descriptor.status(), ExecutionStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_quote_rejected() {
        let router = router();
        let err = router.build_execution(QuoteId::new_v4()).await.unwrap_err();
        assert!(matches!(err, RouterError::QuoteNotFound(_)));
    }

    #[tokio::test]
    async fn eleven_minute_old_quote_rejected_as_stale() {
        let router = router();
        let quote = quote_with(3, Timestamp::now().sub_secs(11 * 60));
        let id = quote.id();
        router
            .store
            .insert(&request_with_tolerance(10), quote)
            .await;

        let err = router.build_execution(id).await.unwrap_err();
        assert!(matches!(err, RouterError::StaleQuote { .. }));
    }

    #[tokio::test]
    async fn excess_price_impact_rejected() {
        let router = router();
        // 12 per-mille impact against a 10 per-mille tolerance.
        let quote = quote_with(12, Timestamp::now());
        let id = quote.id();
        router
            .store
            .insert(&request_with_tolerance(10), quote)
            .await;

        let err = router.build_execution(id).await.unwrap_err();
        assert!(matches!(
            err,
            RouterError::SlippageExceeded {
                price_impact_pm: 12,
                tolerance_pm: 10,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn second_accept_rejected() {
        let router = router();
        let quote = quote_with(3, Timestamp::now());
        let id = quote.id();
        router
            .store
            .insert(&request_with_tolerance(10), quote)
            .await;

        router.build_execution(id).await.unwrap();
        let err = router.build_execution(id).await.unwrap_err();
        assert!(matches!(err, RouterError::AlreadyExecuted(_)));
    }

    #[tokio::test]
    async fn quote_without_call_data_not_executable() {
        let router = router();
        let quote = Quote::builder(
            VenueId::new("1inch"),
            TokenAmount::new(1_000),
            TokenAmount::new(990),
        )
        .build()
        .unwrap();
        let id = quote.id();
        router
            .store
            .insert(&request_with_tolerance(10), quote)
            .await;

        let err = router.build_execution(id).await.unwrap_err();
        assert!(matches!(err, RouterError::NotExecutable { .. }));

        // The failed build did not consume the quote.
        assert!(!router.store.get(id).await.unwrap().accepted);
    }

    #[tokio::test]
    async fn status_lifecycle_enforced() {
        let router = router();
        let quote = quote_with(3, Timestamp::now());
        let id = quote.id();
        router
            .store
            .insert(&request_with_tolerance(10), quote)
            .await;
        let descriptor = router.build_execution(id).await.unwrap();

        // Confirming before submitting is out of order.
        let err = router
            .apply_status(descriptor.id(), ExecutionStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::InvalidTransition(_)));

        let submitted = router
            .apply_status(descriptor.id(), ExecutionStatus::Submitted)
            .await
            .unwrap();
        assert_eq!(submitted.status(), ExecutionStatus::Submitted);

        let confirmed = router
            .apply_status(descriptor.id(), ExecutionStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.status(), ExecutionStatus::Confirmed);
    }

    #[tokio::test]
    async fn unknown_execution_rejected() {
        let router = router();
        let err = router
            .apply_status(ExecutionId::new_v4(), ExecutionStatus::Submitted)
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::ExecutionNotFound(_)));
    }

    #[tokio::test]
    async fn execution_lookup() {
        let router = router();
        let quote = quote_with(3, Timestamp::now());
        let id = quote.id();
        router
            .store
            .insert(&request_with_tolerance(10), quote)
            .await;
        let descriptor = router.build_execution(id).await.unwrap();

        let found = router.execution(descriptor.id()).await.unwrap();
        assert_eq!(found.id(), descriptor.id());
        assert!(router.execution(ExecutionId::new_v4()).await.is_none());
    }
}
