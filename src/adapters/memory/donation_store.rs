//! In-memory DonationStore for development and tests.
//!
//! Every operation holds one write lock, which gives `deactivate_fund` the
//! same all-or-nothing behaviour as the database transaction.
//!
//! Supports failure injection so callers can exercise compensation paths.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::donation::{Donation, DonationPayment, Fund};
use crate::domain::foundation::{DomainError, ErrorCode, FundId};
use crate::ports::DonationStore;

#[derive(Debug, Default)]
struct StoreState {
    funds: HashMap<FundId, Fund>,
    payments: Vec<DonationPayment>,
    failing_reactivations: HashSet<String>,
    fail_deactivation: bool,
}

impl StoreState {
    fn donation_mut(&mut self, subscription_id: &str) -> Option<&mut Donation> {
        self.funds
            .values_mut()
            .flat_map(|fund| fund.donations.iter_mut())
            .find(|d| d.subscription_id() == Some(subscription_id))
    }

    fn donation(&self, subscription_id: &str) -> Option<&Donation> {
        self.funds
            .values()
            .flat_map(|fund| fund.donations.iter())
            .find(|d| d.subscription_id() == Some(subscription_id))
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryDonationStore {
    state: Arc<RwLock<StoreState>>,
}

fn donation_not_found(subscription_id: &str) -> DomainError {
    DomainError::new(ErrorCode::DonationNotFound, "Donation not found")
        .with_detail("subscription_id", subscription_id)
}

impl InMemoryDonationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every reactivation of `subscription_id` fail with a database error.
    pub async fn fail_reactivation_for(&self, subscription_id: impl Into<String>) {
        self.state
            .write()
            .await
            .failing_reactivations
            .insert(subscription_id.into());
    }

    /// Makes the next `deactivate_fund` call fail without changing anything.
    pub async fn fail_next_deactivation(&self) {
        self.state.write().await.fail_deactivation = true;
    }

    /// All payments recorded so far.
    pub async fn payments(&self) -> Vec<DonationPayment> {
        self.state.read().await.payments.clone()
    }
}

#[async_trait]
impl DonationStore for InMemoryDonationStore {
    async fn save_fund(&self, fund: &Fund) -> Result<(), DomainError> {
        self.state.write().await.funds.insert(fund.id, fund.clone());
        Ok(())
    }

    async fn find_fund(&self, fund_id: &FundId) -> Result<Option<Fund>, DomainError> {
        Ok(self.state.read().await.funds.get(fund_id).cloned())
    }

    async fn deactivate_fund(&self, fund_id: &FundId) -> Result<Vec<Donation>, DomainError> {
        let mut state = self.state.write().await;

        if std::mem::take(&mut state.fail_deactivation) {
            return Err(DomainError::database("injected deactivation failure"));
        }

        let fund = state.funds.get_mut(fund_id).ok_or_else(|| {
            DomainError::new(ErrorCode::FundNotFound, "Fund not found")
                .with_detail("fund_id", fund_id.to_string())
        })?;

        Ok(fund.deactivate())
    }

    async fn reactivate_donation_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;

        if state.failing_reactivations.contains(subscription_id) {
            return Err(DomainError::database("injected reactivation failure")
                .with_detail("subscription_id", subscription_id));
        }

        let donation = state
            .donation_mut(subscription_id)
            .ok_or_else(|| donation_not_found(subscription_id))?;
        donation.reactivate();
        Ok(())
    }

    async fn deactivate_donation_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let donation = state
            .donation_mut(subscription_id)
            .ok_or_else(|| donation_not_found(subscription_id))?;
        donation.deactivate();
        Ok(())
    }

    async fn find_donation_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<Donation>, DomainError> {
        Ok(self.state.read().await.donation(subscription_id).cloned())
    }

    async fn record_payment(&self, payment: &DonationPayment) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let duplicate = state
            .payments
            .iter()
            .any(|p| p.provider_payment_id == payment.provider_payment_id);
        if !duplicate {
            state.payments.push(payment.clone());
        }
        Ok(())
    }
}
