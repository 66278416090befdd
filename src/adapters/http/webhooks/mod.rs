//! HTTP adapter for inbound provider notifications.
//!
//! - `POST /webhooks` - Verify, deduplicate and dispatch a PayPal notification

mod handlers;
mod routes;

pub use handlers::{
    receive_webhook, WebhookApiError, WebhookAppState, DEFAULT_BODY_LIMIT, DUPLICATE_WINDOW,
};
pub use routes::webhook_routes;
