//! DonationStore port - Persistence for funds, donations and payments.
//!
//! The reconciler depends on two properties of every implementation:
//!
//! - `deactivate_fund` is atomic: the fund and all of its donations flip to
//!   inactive together, or nothing changes.
//! - `reactivate_donation_by_subscription` is idempotent, so compensation can
//!   be re-run safely.

use async_trait::async_trait;

use crate::domain::donation::{Donation, DonationPayment, Fund};
use crate::domain::foundation::{DomainError, FundId};

#[async_trait]
pub trait DonationStore: Send + Sync {
    /// Inserts or replaces a fund together with its donations.
    async fn save_fund(&self, fund: &Fund) -> Result<(), DomainError>;

    /// Finds a fund by ID, including its donations.
    async fn find_fund(&self, fund_id: &FundId) -> Result<Option<Fund>, DomainError>;

    /// Marks the fund and all of its donations inactive in one atomic step.
    ///
    /// Returns the donations that were deactivated.
    ///
    /// # Errors
    ///
    /// - `FundNotFound` if the fund does not exist
    /// - `DatabaseError` on storage failure (nothing was changed)
    async fn deactivate_fund(&self, fund_id: &FundId) -> Result<Vec<Donation>, DomainError>;

    /// Marks the donation backed by `subscription_id` active again.
    ///
    /// # Errors
    ///
    /// - `DonationNotFound` if no donation carries this subscription id
    async fn reactivate_donation_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<(), DomainError>;

    /// Marks the donation backed by `subscription_id` inactive.
    async fn deactivate_donation_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<(), DomainError>;

    /// Finds the donation backed by a remote subscription.
    async fn find_donation_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<Donation>, DomainError>;

    /// Records a settled payment. Recording the same provider payment twice
    /// is a no-op.
    async fn record_payment(&self, payment: &DonationPayment) -> Result<(), DomainError>;
}
