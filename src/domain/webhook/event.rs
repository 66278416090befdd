//! Provider notification envelope, parsed only after the signature is trusted.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::foundation::ValidationError;

/// Event types the service reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WebhookEventType {
    PaymentSaleCompleted,
    SubscriptionCancelled,
    SubscriptionExpired,
    SubscriptionSuspended,
    SubscriptionPaymentFailed,
    Unknown(String),
}

impl WebhookEventType {
    pub fn as_str(&self) -> &str {
        match self {
            WebhookEventType::PaymentSaleCompleted => "PAYMENT.SALE.COMPLETED",
            WebhookEventType::SubscriptionCancelled => "BILLING.SUBSCRIPTION.CANCELLED",
            WebhookEventType::SubscriptionExpired => "BILLING.SUBSCRIPTION.EXPIRED",
            WebhookEventType::SubscriptionSuspended => "BILLING.SUBSCRIPTION.SUSPENDED",
            WebhookEventType::SubscriptionPaymentFailed => "BILLING.SUBSCRIPTION.PAYMENT.FAILED",
            WebhookEventType::Unknown(other) => other,
        }
    }
}

impl From<&str> for WebhookEventType {
    fn from(s: &str) -> Self {
        match s {
            "PAYMENT.SALE.COMPLETED" => WebhookEventType::PaymentSaleCompleted,
            "BILLING.SUBSCRIPTION.CANCELLED" => WebhookEventType::SubscriptionCancelled,
            "BILLING.SUBSCRIPTION.EXPIRED" => WebhookEventType::SubscriptionExpired,
            "BILLING.SUBSCRIPTION.SUSPENDED" => WebhookEventType::SubscriptionSuspended,
            "BILLING.SUBSCRIPTION.PAYMENT.FAILED" => WebhookEventType::SubscriptionPaymentFailed,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: String,
    event_type: String,
    #[serde(default)]
    resource: Value,
}

/// A verified provider notification.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    pub id: String,
    pub event_type: WebhookEventType,
    /// Event-specific payload, decoded lazily by the handler that owns it.
    pub resource: Value,
}

impl WebhookEvent {
    /// Parses the notification envelope from the raw body.
    pub fn parse(body: &[u8]) -> Result<Self, ValidationError> {
        let raw: RawEvent = serde_json::from_slice(body)
            .map_err(|e| ValidationError::invalid_format("body", e.to_string()))?;

        if raw.id.trim().is_empty() {
            return Err(ValidationError::empty_field("id"));
        }

        Ok(Self {
            id: raw.id,
            event_type: WebhookEventType::from(raw.event_type.as_str()),
            resource: raw.resource,
        })
    }

    /// Decodes `resource` as the payload type a handler expects.
    pub fn resource_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, ValidationError> {
        serde_json::from_value(self.resource.clone())
            .map_err(|e| ValidationError::invalid_format("resource", e.to_string()))
    }
}

/// `resource` of a `PAYMENT.SALE.COMPLETED` event.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSaleResource {
    pub id: String,
    /// Subscription the sale belongs to; absent for one-time payments.
    #[serde(default)]
    pub billing_agreement_id: Option<String>,
    pub amount: SaleAmount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaleAmount {
    pub total: String,
    pub currency: String,
}

/// `resource` of a `BILLING.SUBSCRIPTION.*` event.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionResource {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_known_event_type() {
        let body = json!({
            "id": "WH-1",
            "event_type": "BILLING.SUBSCRIPTION.CANCELLED",
            "resource": { "id": "I-SUB", "status": "CANCELLED" }
        });

        let event = WebhookEvent::parse(body.to_string().as_bytes()).unwrap();

        assert_eq!(event.id, "WH-1");
        assert_eq!(event.event_type, WebhookEventType::SubscriptionCancelled);
        let resource: SubscriptionResource = event.resource_as().unwrap();
        assert_eq!(resource.id, "I-SUB");
    }

    #[test]
    fn unknown_event_type_is_preserved() {
        let body = br#"{"id":"WH-2","event_type":"CUSTOMER.DISPUTE.CREATED"}"#;
        let event = WebhookEvent::parse(body).unwrap();
        assert_eq!(event.event_type.as_str(), "CUSTOMER.DISPUTE.CREATED");
        assert!(event.resource.is_null());
    }

    #[test]
    fn sale_resource_decodes_amount() {
        let body = json!({
            "id": "WH-3",
            "event_type": "PAYMENT.SALE.COMPLETED",
            "resource": {
                "id": "SALE-1",
                "billing_agreement_id": "I-SUB",
                "amount": { "total": "25.00", "currency": "USD" }
            }
        });

        let event = WebhookEvent::parse(body.to_string().as_bytes()).unwrap();
        let sale: PaymentSaleResource = event.resource_as().unwrap();

        assert_eq!(sale.billing_agreement_id.as_deref(), Some("I-SUB"));
        assert_eq!(sale.amount.total, "25.00");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(WebhookEvent::parse(b"{not json").is_err());
    }

    #[test]
    fn rejects_blank_event_id() {
        let body = br#"{"id":"  ","event_type":"PAYMENT.SALE.COMPLETED"}"#;
        assert!(matches!(
            WebhookEvent::parse(body),
            Err(ValidationError::EmptyField { .. })
        ));
    }
}
