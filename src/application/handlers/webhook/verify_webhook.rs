//! VerifyWebhookHandler - Decides whether an inbound notification is trusted.
//!
//! States run strictly in order and the first failure is terminal:
//!
//! 1. Transmission headers present
//! 2. Canonical message built from headers, webhook id and body CRC-32
//! 3. Signing certificate resolved from `cert-url`
//! 4. Signature verified with the certificate's key
//!
//! No certificate is fetched unless every header is present.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::domain::webhook::{
    verify_signature, ChecksumFormat, KeyAlgorithm, TransmissionHeaders, VerificationMessage,
    WebhookRejection,
};
use crate::ports::CertificateSource;

pub struct VerifyWebhookHandler {
    certificates: Arc<dyn CertificateSource>,
    webhook_id: String,
    checksum_format: ChecksumFormat,
}

impl VerifyWebhookHandler {
    pub fn new(certificates: Arc<dyn CertificateSource>, webhook_id: impl Into<String>) -> Self {
        Self {
            certificates,
            webhook_id: webhook_id.into(),
            checksum_format: ChecksumFormat::default(),
        }
    }

    pub fn with_checksum_format(mut self, format: ChecksumFormat) -> Self {
        self.checksum_format = format;
        self
    }

    /// Verifies a notification; `Ok` means the body's origin is trusted.
    pub async fn verify(
        &self,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<KeyAlgorithm, WebhookRejection> {
        let transmission = TransmissionHeaders::from_headers(headers)?;

        let message =
            VerificationMessage::new(&transmission, &self.webhook_id, body, self.checksum_format);

        let pem = self
            .certificates
            .load_certificate(&transmission.cert_url)
            .await
            .map_err(|e| {
                tracing::warn!(
                    transmission_id = %transmission.transmission_id,
                    cert_url = %transmission.cert_url,
                    error = %e,
                    "Could not resolve webhook signing certificate"
                );
                WebhookRejection::Certificate(e.to_string())
            })?;

        let algorithm = verify_signature(&pem, &message, &transmission.signature)?;

        tracing::debug!(
            transmission_id = %transmission.transmission_id,
            algorithm = ?algorithm,
            "Webhook signature verified"
        );

        Ok(algorithm)
    }
}
