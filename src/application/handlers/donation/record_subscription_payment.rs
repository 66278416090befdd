//! RecordSubscriptionPaymentHandler - Records settled subscription payments.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::donation::{dollars_to_cents, DonationPayment};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::webhook::{PaymentSaleResource, WebhookEvent, WebhookEventType};
use crate::ports::{DonationStore, WebhookEventHandler};

/// Handles `PAYMENT.SALE.COMPLETED` by recording the sale against the
/// donation whose subscription produced it.
pub struct RecordSubscriptionPaymentHandler {
    store: Arc<dyn DonationStore>,
}

impl RecordSubscriptionPaymentHandler {
    pub fn new(store: Arc<dyn DonationStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl WebhookEventHandler for RecordSubscriptionPaymentHandler {
    async fn handle(&self, event: WebhookEvent) -> Result<(), DomainError> {
        let sale: PaymentSaleResource = event.resource_as()?;

        let Some(subscription_id) = sale.billing_agreement_id.as_deref().filter(|s| !s.is_empty())
        else {
            tracing::debug!(event_id = %event.id, sale_id = %sale.id, "Sale is not part of a subscription");
            return Ok(());
        };

        let donation = self
            .store
            .find_donation_by_subscription(subscription_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::DonationNotFound, "No donation for subscription")
                    .with_detail("subscription_id", subscription_id)
                    .with_detail("event_id", event.id.clone())
            })?;

        let amount_cents = dollars_to_cents(&sale.amount.total)?;
        let payment = DonationPayment::new(donation.id, sale.id, amount_cents);
        self.store.record_payment(&payment).await?;

        tracing::info!(
            event_id = %event.id,
            donation_id = %donation.id,
            amount_cents,
            currency = %sale.amount.currency,
            "Recorded subscription payment"
        );
        Ok(())
    }

    fn event_types(&self) -> Vec<WebhookEventType> {
        vec![WebhookEventType::PaymentSaleCompleted]
    }

    fn name(&self) -> &'static str {
        "RecordSubscriptionPaymentHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryDonationStore;
    use crate::domain::donation::{Donation, Fund};
    use crate::domain::foundation::DonorId;
    use serde_json::json;

    async fn store_with_subscription(subscription_id: &str) -> (InMemoryDonationStore, Donation) {
        let store = InMemoryDonationStore::new();
        let mut fund = Fund::new("General");
        let donation = Donation::recurring(fund.id, DonorId::new(), subscription_id).unwrap();
        fund.add_donation(donation.clone());
        store.save_fund(&fund).await.unwrap();
        (store, donation)
    }

    fn sale_event(billing_agreement_id: Option<&str>, total: &str) -> WebhookEvent {
        WebhookEvent {
            id: "WH-SALE".to_string(),
            event_type: WebhookEventType::PaymentSaleCompleted,
            resource: json!({
                "id": "SALE-1",
                "billing_agreement_id": billing_agreement_id,
                "amount": { "total": total, "currency": "USD" }
            }),
        }
    }

    #[tokio::test]
    async fn records_payment_in_cents() {
        let (store, donation) = store_with_subscription("I-SUB").await;
        let handler = RecordSubscriptionPaymentHandler::new(Arc::new(store.clone()));

        handler.handle(sale_event(Some("I-SUB"), "12.5")).await.unwrap();

        let payments = store.payments().await;
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].donation_id, donation.id);
        assert_eq!(payments[0].amount_cents, 1250);
        assert_eq!(payments[0].provider_payment_id, "SALE-1");
    }

    #[tokio::test]
    async fn one_time_sale_is_ignored() {
        let (store, _) = store_with_subscription("I-SUB").await;
        let handler = RecordSubscriptionPaymentHandler::new(Arc::new(store.clone()));

        handler.handle(sale_event(None, "5.00")).await.unwrap();

        assert!(store.payments().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_subscription_is_error() {
        let (store, _) = store_with_subscription("I-SUB").await;
        let handler = RecordSubscriptionPaymentHandler::new(Arc::new(store));

        let err = handler
            .handle(sale_event(Some("I-OTHER"), "5.00"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::DonationNotFound);
    }

    #[tokio::test]
    async fn malformed_amount_is_validation_error() {
        let (store, _) = store_with_subscription("I-SUB").await;
        let handler = RecordSubscriptionPaymentHandler::new(Arc::new(store));

        let err = handler
            .handle(sale_event(Some("I-SUB"), "12.345"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
