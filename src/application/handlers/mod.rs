//! Application handlers.
//!
//! Command and event handlers that orchestrate domain operations.

pub mod donation;
pub mod fund;
pub mod webhook;

pub use donation::{EndSubscriptionHandler, RecordSubscriptionPaymentHandler};
pub use fund::{
    CompensationFailure, DeactivateFundCommand, DeactivateFundError, DeactivateFundHandler,
    DeactivateFundResult,
};
pub use webhook::VerifyWebhookHandler;
