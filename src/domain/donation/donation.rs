//! Donation entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DonationId, DonorId, FundId, ValidationError};

/// A single donation to a fund.
///
/// Recurring donations carry the provider's subscription identifier, which
/// is the join key between local state and remote billing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub id: DonationId,
    pub fund_id: FundId,
    pub donor_id: DonorId,
    pub remote_subscription_id: Option<String>,
    pub recurring: bool,
    pub active: bool,
}

impl Donation {
    /// Creates an active one-time donation.
    pub fn one_time(fund_id: FundId, donor_id: DonorId) -> Self {
        Self {
            id: DonationId::new(),
            fund_id,
            donor_id,
            remote_subscription_id: None,
            recurring: false,
            active: true,
        }
    }

    /// Creates an active recurring donation backed by a provider subscription.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyField` if the subscription id is blank.
    pub fn recurring(
        fund_id: FundId,
        donor_id: DonorId,
        subscription_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let subscription_id = subscription_id.into();
        if subscription_id.trim().is_empty() {
            return Err(ValidationError::empty_field("remote_subscription_id"));
        }

        Ok(Self {
            id: DonationId::new(),
            fund_id,
            donor_id,
            remote_subscription_id: Some(subscription_id),
            recurring: true,
            active: true,
        })
    }

    /// Returns the provider subscription id when it is present and non-empty.
    pub fn subscription_id(&self) -> Option<&str> {
        self.remote_subscription_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn reactivate(&mut self) {
        self.active = true;
    }
}
