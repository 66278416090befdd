//! Donation event handlers, driven by verified provider notifications.

mod end_subscription;
mod record_subscription_payment;

pub use end_subscription::EndSubscriptionHandler;
pub use record_subscription_payment::RecordSubscriptionPaymentHandler;
