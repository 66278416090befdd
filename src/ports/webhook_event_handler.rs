//! WebhookEventHandler port - Reacts to verified provider notifications.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::webhook::{WebhookEvent, WebhookEventType};

/// Handler for verified provider notifications.
///
/// Handlers must be idempotent: the provider redelivers notifications and
/// deduplication only covers a bounded window.
#[async_trait]
pub trait WebhookEventHandler: Send + Sync {
    /// Process a verified event.
    async fn handle(&self, event: WebhookEvent) -> Result<(), DomainError>;

    /// Event types this handler subscribes to.
    fn event_types(&self) -> Vec<WebhookEventType>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}
