//! Batched subscription cancellation against the PayPal Subscriptions API.

use std::sync::Arc;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::ports::{PaymentError, PaymentErrorCode, SubscriptionProvider};

use super::PaypalClient;

/// Issue code PayPal returns when cancelling a subscription that is already
/// cancelled or expired.
const STATUS_INVALID_ISSUE: &str = "SUBSCRIPTION_STATUS_INVALID";

const DEFAULT_CANCEL_REASON: &str = "Fund deactivated";

/// Everything except RFC 3986 unreserved characters is escaped in a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Serialize)]
struct CancelRequest<'a> {
    reason: &'a str,
}

pub struct PaypalSubscriptions {
    client: Arc<PaypalClient>,
    reason: String,
}

impl PaypalSubscriptions {
    pub fn new(client: Arc<PaypalClient>) -> Self {
        Self {
            client,
            reason: DEFAULT_CANCEL_REASON.to_string(),
        }
    }

    /// Reason text sent with every cancellation.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    async fn cancel_one(&self, subscription_id: &str) -> Result<(), PaymentError> {
        let path = cancel_path(subscription_id);
        self.client
            .post_json::<_, ()>(&path, &CancelRequest { reason: &self.reason })
            .await
    }
}

fn cancel_path(subscription_id: &str) -> String {
    format!(
        "/v1/billing/subscriptions/{}/cancel",
        utf8_percent_encode(subscription_id, PATH_SEGMENT)
    )
}

/// Errors meaning the subscription is already not billing.
fn is_already_cancelled(error: &PaymentError) -> bool {
    error.code == PaymentErrorCode::NotFound
        || error.provider_code.as_deref() == Some(STATUS_INVALID_ISSUE)
}

/// Errors that say nothing about an individual subscription.
fn fails_whole_batch(error: &PaymentError) -> bool {
    matches!(
        error.code,
        PaymentErrorCode::NetworkError
            | PaymentErrorCode::AuthenticationError
            | PaymentErrorCode::RateLimitExceeded
    )
}

#[async_trait]
impl SubscriptionProvider for PaypalSubscriptions {
    async fn cancel_subscriptions(
        &self,
        subscription_ids: &[String],
    ) -> Result<Vec<String>, PaymentError> {
        let mut cancelled = Vec::with_capacity(subscription_ids.len());

        for id in subscription_ids {
            match self.cancel_one(id).await {
                Ok(()) => cancelled.push(id.clone()),
                Err(e) if is_already_cancelled(&e) => {
                    tracing::info!(subscription_id = %id, error = %e, "Subscription already cancelled");
                    cancelled.push(id.clone());
                }
                Err(e) if fails_whole_batch(&e) => {
                    tracing::error!(
                        subscription_id = %id,
                        cancelled_so_far = cancelled.len(),
                        error = %e,
                        "Subscription cancellation batch failed"
                    );
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        subscription_id = %id,
                        provider_code = ?e.provider_code,
                        error = %e,
                        "Provider refused to cancel subscription"
                    );
                }
            }
        }

        tracing::info!(
            requested = subscription_ids.len(),
            cancelled = cancelled.len(),
            "Subscription cancellation batch completed"
        );

        Ok(cancelled)
    }
}
