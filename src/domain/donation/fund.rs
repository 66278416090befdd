//! Fund aggregate.

use serde::{Deserialize, Serialize};

use super::Donation;
use crate::domain::foundation::FundId;

/// A fund and the donations made to it.
///
/// Once a fund is inactive, every recurring donation must settle inactive
/// as well, except those whose remote cancellation failed: those stay
/// active because the provider keeps billing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fund {
    pub id: FundId,
    pub name: String,
    pub active: bool,
    pub donations: Vec<Donation>,
}

impl Fund {
    /// Creates an active fund with no donations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: FundId::new(),
            name: name.into(),
            active: true,
            donations: Vec::new(),
        }
    }

    /// Adds a donation, re-homing it onto this fund.
    pub fn add_donation(&mut self, mut donation: Donation) {
        donation.fund_id = self.id;
        self.donations.push(donation);
    }

    /// Marks the fund and every donation inactive, returning the donations touched.
    pub fn deactivate(&mut self) -> Vec<Donation> {
        self.active = false;
        self.donations
            .iter_mut()
            .map(|donation| {
                donation.deactivate();
                donation.clone()
            })
            .collect()
    }

    /// Recurring donations that are still active.
    pub fn active_recurring(&self) -> impl Iterator<Item = &Donation> {
        self.donations.iter().filter(|d| d.recurring && d.active)
    }
}
