//! Payments recorded against donations.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DonationId, PaymentId, Timestamp, ValidationError};

/// A settled payment reported by the provider for a donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationPayment {
    pub id: PaymentId,
    pub donation_id: DonationId,
    /// Provider's sale/transaction identifier.
    pub provider_payment_id: String,
    pub amount_cents: i64,
    pub recorded_at: Timestamp,
}

impl DonationPayment {
    pub fn new(
        donation_id: DonationId,
        provider_payment_id: impl Into<String>,
        amount_cents: i64,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            donation_id,
            provider_payment_id: provider_payment_id.into(),
            amount_cents,
            recorded_at: Timestamp::now(),
        }
    }
}

/// Converts a provider dollar string such as `"10.5"` or `"1,024.00"` to cents.
///
/// # Errors
///
/// Returns `ValidationError::InvalidFormat` for negative values, more than two
/// fractional digits, or anything that is not a plain decimal number.
pub fn dollars_to_cents(amount: &str) -> Result<i64, ValidationError> {
    let invalid = |reason: &str| ValidationError::invalid_format("amount", reason);

    let cleaned: String = amount.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(ValidationError::empty_field("amount"));
    }

    let (whole, fraction) = match cleaned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (cleaned.as_str(), ""),
    };

    if fraction.len() > 2 {
        return Err(invalid("more than two fractional digits"));
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) || (whole.is_empty() && fraction.is_empty()) {
        return Err(invalid("not a decimal dollar amount"));
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("dollar amount overflow"))?
    };
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid("bad cents"))? * 10,
        _ => fraction.parse().map_err(|_| invalid("bad cents"))?,
    };

    whole
        .checked_mul(100)
        .and_then(|cents| cents.checked_add(fraction))
        .ok_or_else(|| invalid("dollar amount overflow"))
}
