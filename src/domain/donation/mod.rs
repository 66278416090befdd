//! Donation domain module.
//!
//! Funds collect donations; recurring donations are backed by a remote
//! subscription at the payment provider.
//!
//! # Module Structure
//!
//! - `fund` - Fund aggregate and its donations
//! - `donation` - Donation entity (one-time or recurring)
//! - `payment` - Payments recorded against donations

mod donation;
mod fund;
mod payment;

pub use donation::Donation;
pub use fund::Fund;
pub use payment::{dollars_to_cents, DonationPayment};
