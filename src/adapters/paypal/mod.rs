//! PayPal adapter.
//!
//! Implements the provider-facing ports against the PayPal REST API:
//! - `TokenClient` - OAuth2 client-credentials exchange (`CredentialSource`)
//! - `CredentialCache` - Reuses the access token until it expires
//! - `PaypalClient` - Authorized JSON requests with error decoding
//! - `PaypalSubscriptions` - Batched cancellation (`SubscriptionProvider`)
//! - `MockSubscriptionProvider` - Scriptable provider for tests
//! - `FileCertificateCache` - Signing certificate download + disk cache
//!   (`CertificateSource`)
//!
//! # Security
//!
//! - Client secret and access tokens are held in `secrecy::SecretString`
//!   and redacted from `Debug` output
//! - Certificate URLs are restricted to an allow-list of PayPal hosts

mod certificate_cache;
mod client;
mod config;
mod credential_cache;
mod mock_subscription_provider;
mod subscriptions;
mod token_client;

pub use certificate_cache::{FileCertificateCache, DEFAULT_ALLOWED_HOSTS};
pub use client::PaypalClient;
pub use config::{PaypalApiConfig, DEFAULT_REQUEST_TIMEOUT, SANDBOX_BASE_URL};
pub use credential_cache::CredentialCache;
pub use mock_subscription_provider::MockSubscriptionProvider;
pub use subscriptions::PaypalSubscriptions;
pub use token_client::TokenClient;
