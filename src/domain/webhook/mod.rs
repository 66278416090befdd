//! Webhook trust domain.
//!
//! A provider notification is trusted only when its transmission signature
//! verifies against the provider's public key over the canonical message
//! `transmission_id|transmission_time|webhook_id|crc32(body)`.
//!
//! # Module Structure
//!
//! - `headers` - Transmission header extraction
//! - `message` - CRC-32 checksum and canonical verification message
//! - `signature` - Public key parsing and algorithm dispatch
//! - `errors` - Rejection taxonomy
//! - `event` - Notification envelope and event types

mod errors;
mod event;
mod headers;
mod message;
mod signature;

#[cfg(test)]
pub(crate) mod fixtures;

pub use errors::WebhookRejection;
pub use event::{
    PaymentSaleResource, SaleAmount, SubscriptionResource, WebhookEvent, WebhookEventType,
};
pub use headers::{
    TransmissionHeaders, CERT_URL_HEADER, TRANSMISSION_ID_HEADER, TRANSMISSION_SIG_HEADER,
    TRANSMISSION_TIME_HEADER,
};
pub use message::{crc32_checksum, ChecksumFormat, VerificationMessage};
pub use signature::{decode_signature, verify_signature, KeyAlgorithm, PublicKey};
