//! Webhook trust handlers.

mod verify_webhook;

pub use verify_webhook::VerifyWebhookHandler;
