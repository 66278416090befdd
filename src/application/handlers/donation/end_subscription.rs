//! EndSubscriptionHandler - Deactivates donations whose subscription ended
//! at the provider.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::webhook::{SubscriptionResource, WebhookEvent, WebhookEventType};
use crate::ports::{DonationStore, WebhookEventHandler};

pub struct EndSubscriptionHandler {
    store: Arc<dyn DonationStore>,
}

impl EndSubscriptionHandler {
    pub fn new(store: Arc<dyn DonationStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl WebhookEventHandler for EndSubscriptionHandler {
    async fn handle(&self, event: WebhookEvent) -> Result<(), DomainError> {
        let subscription: SubscriptionResource = event.resource_as()?;

        match self
            .store
            .deactivate_donation_by_subscription(&subscription.id)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    subscription_id = %subscription.id,
                    "Donation deactivated after subscription ended"
                );
                Ok(())
            }
            // Subscriptions created outside this service have no donation
            Err(e) if e.code == ErrorCode::DonationNotFound => {
                tracing::debug!(subscription_id = %subscription.id, "No donation for ended subscription");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn event_types(&self) -> Vec<WebhookEventType> {
        vec![
            WebhookEventType::SubscriptionCancelled,
            WebhookEventType::SubscriptionExpired,
        ]
    }

    fn name(&self) -> &'static str {
        "EndSubscriptionHandler"
    }
}
