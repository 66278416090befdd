//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `DonationStore` - Funds, donations and recorded payments
//!
//! ## Provider Ports
//!
//! - `SubscriptionProvider` - Batched remote subscription cancellation
//! - `CredentialSource` - Access credential issuance
//! - `CertificateSource` - Signing certificate resolution
//!
//! ## Webhook Ports
//!
//! - `WebhookEventHandler` - Reacts to verified provider notifications

mod certificate_source;
mod credential_source;
mod donation_store;
mod subscription_provider;
mod webhook_event_handler;

pub use certificate_source::{CertificateError, CertificateSource};
pub use credential_source::{Credential, CredentialSource};
pub use donation_store::DonationStore;
pub use subscription_provider::{PaymentError, PaymentErrorCode, SubscriptionProvider};
pub use webhook_event_handler::WebhookEventHandler;
