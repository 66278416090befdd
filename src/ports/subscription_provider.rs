//! Subscription provider port for remote recurring-payment management.
//!
//! # Design
//!
//! - **Batched**: one call cancels many subscriptions
//! - **Partial success**: the result lists exactly the ids that are now
//!   cancelled at the provider; missing ids were not cancelled
//! - **Idempotent**: cancelling an already-cancelled subscription counts as
//!   success

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for the remote subscription provider.
#[async_trait]
pub trait SubscriptionProvider: Send + Sync {
    /// Cancels the given subscriptions.
    ///
    /// Returns the subset of `subscription_ids` that were successfully
    /// cancelled. An `Err` means the batch as a whole failed and the caller
    /// must treat no subscription as cancelled.
    async fn cancel_subscriptions(
        &self,
        subscription_ids: &[String],
    ) -> Result<Vec<String>, PaymentError>;
}

/// Payment provider errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error name (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Create with provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(
            PaymentErrorCode::NotFound,
            format!("{} not found", resource),
        )
    }

    /// Create an error for a response the provider rejected.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// Credential could not be obtained or was refused.
    AuthenticationError,

    /// Resource not found.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Provider rejected the request.
    ProviderError,

    /// Response could not be decoded.
    InvalidResponse,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::ProviderError => "provider_error",
            PaymentErrorCode::InvalidResponse => "invalid_response",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_provider_is_object_safe() {
        fn _accepts_dyn(_provider: &dyn SubscriptionProvider) {}
    }

    #[test]
    fn payment_error_retryable() {
        assert!(PaymentErrorCode::NetworkError.is_retryable());
        assert!(PaymentErrorCode::RateLimitExceeded.is_retryable());

        assert!(!PaymentErrorCode::AuthenticationError.is_retryable());
        assert!(!PaymentErrorCode::NotFound.is_retryable());
    }

    #[test]
    fn payment_error_display() {
        let err = PaymentError::authentication("token endpoint returned 401");
        assert!(err.to_string().contains("authentication_error"));
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn provider_code_is_attached() {
        let err = PaymentError::provider("bad state").with_provider_code("UNPROCESSABLE_ENTITY");
        assert_eq!(err.provider_code.as_deref(), Some("UNPROCESSABLE_ENTITY"));
        assert!(!err.retryable);
    }
}
