//! Webhook rejection reasons.
//!
//! Every variant is a terminal REJECT of the verification state machine: the
//! notification is simply not trusted, never escalated to a crash.

use axum::http::StatusCode;
use thiserror::Error;

/// Why an inbound provider notification was not trusted.
#[derive(Debug, Error)]
pub enum WebhookRejection {
    /// A required transmission header was absent or not valid UTF-8.
    #[error("Missing header: {0}")]
    MissingHeader(&'static str),

    /// The request body could not be read.
    #[error("Body read error: {0}")]
    BodyRead(String),

    /// The signing certificate could not be fetched or parsed.
    #[error("Certificate error: {0}")]
    Certificate(String),

    /// The certificate carries a key type we do not verify.
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// The signature is malformed or does not match the message.
    #[error("Invalid signature")]
    SignatureInvalid,
}

impl WebhookRejection {
    /// Returns true if the provider should retry delivering this notification.
    ///
    /// Only certificate resolution can fail for transient reasons; every
    /// other rejection will fail the same way on redelivery.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookRejection::Certificate(_))
    }

    /// Maps the rejection to the HTTP status returned to the provider.
    ///
    /// - 4xx: the notification is not trusted, no retry expected
    /// - 503: certificate could not be resolved, provider may retry
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookRejection::Certificate(_) => StatusCode::SERVICE_UNAVAILABLE,
            WebhookRejection::MissingHeader(_)
            | WebhookRejection::BodyRead(_)
            | WebhookRejection::UnsupportedKeyType(_) => StatusCode::BAD_REQUEST,
            WebhookRejection::SignatureInvalid => StatusCode::UNAUTHORIZED,
        }
    }

    /// Short, stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookRejection::MissingHeader(_) => "missing_header",
            WebhookRejection::BodyRead(_) => "body_read_error",
            WebhookRejection::Certificate(_) => "certificate_error",
            WebhookRejection::UnsupportedKeyType(_) => "unsupported_key_type",
            WebhookRejection::SignatureInvalid => "signature_invalid",
        }
    }
}
