//! DeactivateFundHandler - Deactivates a fund and reconciles its subscriptions.
//!
//! This is a local-first saga, not a distributed transaction:
//!
//! 1. Fund and donations go inactive in one local transaction
//! 2. Recurring donations' subscriptions are cancelled in one provider batch
//! 3. Every subscription the provider did not cancel has its donation
//!    reactivated (compensation)
//!
//! Step 1 stays committed whatever happens afterwards. A failed or timed-out
//! batch aborts before compensation; a failed compensation is reported with
//! every subscription left inconsistent.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::domain::foundation::{DomainError, FundId};
use crate::ports::{DonationStore, PaymentError, SubscriptionProvider};

/// Command to deactivate a fund.
#[derive(Debug, Clone)]
pub struct DeactivateFundCommand {
    pub fund_id: FundId,
}

/// Outcome of a completed deactivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeactivateFundResult {
    pub fund_id: FundId,
    /// Donations marked inactive in step 1.
    pub deactivated: usize,
    /// Subscriptions the provider confirmed cancelled.
    pub cancelled: Vec<String>,
    /// Subscriptions whose donations were reactivated because the provider
    /// kept them billing.
    pub reactivated: Vec<String>,
}

/// A compensating reactivation that did not succeed.
#[derive(Debug, Clone)]
pub struct CompensationFailure {
    pub subscription_id: String,
    pub error: DomainError,
}

#[derive(Debug, Error)]
pub enum DeactivateFundError {
    /// Local deactivation failed; nothing changed.
    #[error("Fund deactivation failed: {0}")]
    Store(DomainError),

    /// The provider failed the whole batch; local deactivation is committed.
    #[error("Subscription cancellation failed: {0}")]
    Cancellation(PaymentError),

    /// The provider did not answer in time; local deactivation is committed.
    #[error("Subscription cancellation timed out after {0:?}")]
    ProviderTimeout(Duration),

    /// Some donations could not be reactivated and remain inactive while
    /// their subscriptions keep billing.
    #[error("Compensation failed for {} subscription(s)", failures.len())]
    Compensation {
        fund_id: FundId,
        failures: Vec<CompensationFailure>,
    },
}

impl DeactivateFundError {
    /// Subscription ids left inconsistent by a failed compensation.
    pub fn inconsistent_subscriptions(&self) -> Vec<&str> {
        match self {
            DeactivateFundError::Compensation { failures, .. } => {
                failures.iter().map(|f| f.subscription_id.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

pub struct DeactivateFundHandler {
    store: Arc<dyn DonationStore>,
    provider: Arc<dyn SubscriptionProvider>,
    provider_timeout: Option<Duration>,
}

impl DeactivateFundHandler {
    pub fn new(store: Arc<dyn DonationStore>, provider: Arc<dyn SubscriptionProvider>) -> Self {
        Self {
            store,
            provider,
            provider_timeout: None,
        }
    }

    /// Bounds the batch cancellation call.
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = Some(timeout);
        self
    }

    pub async fn handle(
        &self,
        cmd: DeactivateFundCommand,
    ) -> Result<DeactivateFundResult, DeactivateFundError> {
        let fund_id = cmd.fund_id;

        // 1. Local, atomic
        let donations = self
            .store
            .deactivate_fund(&fund_id)
            .await
            .map_err(DeactivateFundError::Store)?;

        // 2. Live subscriptions only
        let requested: Vec<String> = donations
            .iter()
            .filter_map(|d| d.subscription_id())
            .map(str::to_string)
            .collect();

        tracing::info!(
            fund_id = %fund_id,
            deactivated = donations.len(),
            subscriptions = requested.len(),
            "Fund deactivated locally"
        );

        if requested.is_empty() {
            return Ok(DeactivateFundResult {
                fund_id,
                deactivated: donations.len(),
                cancelled: Vec::new(),
                reactivated: Vec::new(),
            });
        }

        // 3. One provider batch
        let cancelled = self.cancel_batch(&fund_id, &requested).await?;

        // 4. requested - cancelled
        let cancelled_set: HashSet<&str> = cancelled.iter().map(String::as_str).collect();
        let uncancelled: Vec<String> = requested
            .iter()
            .filter(|id| !cancelled_set.contains(id.as_str()))
            .cloned()
            .collect();

        // 5. Compensate; attempt every reactivation before reporting
        let mut failures = Vec::new();
        for subscription_id in &uncancelled {
            if let Err(error) = self
                .store
                .reactivate_donation_by_subscription(subscription_id)
                .await
            {
                tracing::error!(
                    fund_id = %fund_id,
                    subscription_id = %subscription_id,
                    error = %error,
                    "Compensating reactivation failed; donation inactive while subscription is live"
                );
                failures.push(CompensationFailure {
                    subscription_id: subscription_id.clone(),
                    error,
                });
            }
        }

        // 6. Surface compensation failure
        if !failures.is_empty() {
            return Err(DeactivateFundError::Compensation { fund_id, failures });
        }

        if !uncancelled.is_empty() {
            tracing::warn!(
                fund_id = %fund_id,
                reactivated = ?uncancelled,
                "Provider kept subscriptions billing; donations reactivated"
            );
        }

        Ok(DeactivateFundResult {
            fund_id,
            deactivated: donations.len(),
            cancelled,
            reactivated: uncancelled,
        })
    }

    async fn cancel_batch(
        &self,
        fund_id: &FundId,
        requested: &[String],
    ) -> Result<Vec<String>, DeactivateFundError> {
        let call = self.provider.cancel_subscriptions(requested);

        let outcome = match self.provider_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                tracing::error!(fund_id = %fund_id, timeout = ?limit, "Subscription cancellation timed out");
                DeactivateFundError::ProviderTimeout(limit)
            })?,
            None => call.await,
        };

        outcome.map_err(|e| {
            tracing::error!(fund_id = %fund_id, error = %e, "Subscription cancellation batch failed");
            DeactivateFundError::Cancellation(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryDonationStore;
    use crate::adapters::paypal::MockSubscriptionProvider;
    use crate::domain::donation::{Donation, Fund};
    use crate::domain::foundation::{DonorId, ErrorCode};

    struct Fixture {
        store: InMemoryDonationStore,
        provider: MockSubscriptionProvider,
        handler: DeactivateFundHandler,
        fund: Fund,
    }

    async fn fixture(subscriptions: &[&str]) -> Fixture {
        let store = InMemoryDonationStore::new();
        let provider = MockSubscriptionProvider::new();
        let mut fund = Fund::new("Library");
        for sub in subscriptions {
            fund.add_donation(Donation::recurring(fund.id, DonorId::new(), *sub).unwrap());
        }
        fund.add_donation(Donation::one_time(fund.id, DonorId::new()));
        store.save_fund(&fund).await.unwrap();

        let handler = DeactivateFundHandler::new(
            Arc::new(store.clone()),
            Arc::new(provider.clone()),
        );
        Fixture {
            store,
            provider,
            handler,
            fund,
        }
    }

    fn cmd(fund: &Fund) -> DeactivateFundCommand {
        DeactivateFundCommand { fund_id: fund.id }
    }

    async fn is_active(store: &InMemoryDonationStore, subscription_id: &str) -> bool {
        store
            .find_donation_by_subscription(subscription_id)
            .await
            .unwrap()
            .unwrap()
            .active
    }

    #[tokio::test]
    async fn reactivates_donations_whose_subscriptions_were_not_cancelled() {
        let f = fixture(&["A", "B"]).await;
        f.provider.refuse("B");

        let result = f.handler.handle(cmd(&f.fund)).await.unwrap();

        assert_eq!(f.provider.calls(), vec![vec!["A".to_string(), "B".to_string()]]);
        assert_eq!(result.cancelled, vec!["A".to_string()]);
        assert_eq!(result.reactivated, vec!["B".to_string()]);
        assert_eq!(result.deactivated, 3);

        let fund = f.store.find_fund(&f.fund.id).await.unwrap().unwrap();
        assert!(!fund.active);
        assert!(!is_active(&f.store, "A").await);
        assert!(is_active(&f.store, "B").await);
    }

    #[tokio::test]
    async fn fund_without_recurring_donations_skips_provider() {
        let f = fixture(&[]).await;

        let result = f.handler.handle(cmd(&f.fund)).await.unwrap();

        assert!(f.provider.calls().is_empty());
        assert_eq!(result.deactivated, 1);
        assert!(result.cancelled.is_empty());
    }

    #[tokio::test]
    async fn unknown_fund_is_store_error() {
        let f = fixture(&["A"]).await;

        let err = f
            .handler
            .handle(DeactivateFundCommand {
                fund_id: FundId::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DeactivateFundError::Store(ref e) if e.code == ErrorCode::FundNotFound));
        assert!(f.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn batch_failure_aborts_without_compensation() {
        let f = fixture(&["A", "B"]).await;
        f.provider.fail_batch(PaymentError::network("connection refused"));

        let err = f.handler.handle(cmd(&f.fund)).await.unwrap_err();

        assert!(matches!(err, DeactivateFundError::Cancellation(_)));
        assert!(!is_active(&f.store, "A").await);
        assert!(!is_active(&f.store, "B").await);
    }

    #[tokio::test]
    async fn provider_timeout_aborts_before_compensation() {
        let mut f = fixture(&["A"]).await;
        f.provider.delay(Duration::from_millis(200));
        f.provider.refuse("A");
        f.handler = DeactivateFundHandler::new(
            Arc::new(f.store.clone()),
            Arc::new(f.provider.clone()),
        )
        .with_provider_timeout(Duration::from_millis(20));

        let err = f.handler.handle(cmd(&f.fund)).await.unwrap_err();

        assert!(matches!(err, DeactivateFundError::ProviderTimeout(_)));
        assert!(!is_active(&f.store, "A").await);
    }

    #[tokio::test]
    async fn compensation_failure_is_surfaced_after_trying_all() {
        let f = fixture(&["A", "B", "C"]).await;
        f.provider.refuse("A");
        f.provider.refuse("B");
        f.store.fail_reactivation_for("A").await;

        let err = f.handler.handle(cmd(&f.fund)).await.unwrap_err();

        assert_eq!(err.inconsistent_subscriptions(), vec!["A"]);
        assert!(!is_active(&f.store, "A").await);
        assert!(is_active(&f.store, "B").await);
        assert!(!is_active(&f.store, "C").await);
    }

    #[tokio::test]
    async fn everything_cancelled_needs_no_compensation() {
        let f = fixture(&["A", "B"]).await;

        let result = f.handler.handle(cmd(&f.fund)).await.unwrap();

        assert_eq!(result.cancelled.len(), 2);
        assert!(result.reactivated.is_empty());
        assert!(!is_active(&f.store, "A").await);
        assert!(!is_active(&f.store, "B").await);
    }
}
