//! HTTP handler for provider notifications.
//!
//! Nothing in the body is interpreted before the signature is verified.
//! After that, deliveries are acknowledged once per event id inside
//! `DUPLICATE_WINDOW` and handed to the dispatcher.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::adapters::cache::ExpiringStore;
use crate::adapters::events::WebhookDispatcher;
use crate::application::handlers::webhook::VerifyWebhookHandler;
use crate::domain::foundation::ValidationError;
use crate::domain::webhook::{WebhookEvent, WebhookRejection};

/// Largest notification body accepted, in bytes.
pub const DEFAULT_BODY_LIMIT: usize = 256 * 1024;

/// How long a processed event id suppresses redeliveries.
pub const DUPLICATE_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct WebhookAppState {
    pub verifier: Arc<VerifyWebhookHandler>,
    pub dispatcher: Arc<WebhookDispatcher>,
    /// Event ids already dispatched.
    pub seen_events: Arc<ExpiringStore<String, ()>>,
    pub body_limit: usize,
}

impl WebhookAppState {
    pub fn new(verifier: Arc<VerifyWebhookHandler>, dispatcher: Arc<WebhookDispatcher>) -> Self {
        Self {
            verifier,
            dispatcher,
            seen_events: Arc::new(ExpiringStore::new()),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhooks - Receive a provider notification
pub async fn receive_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<impl IntoResponse, WebhookApiError> {
    let body = axum::body::to_bytes(body, state.body_limit)
        .await
        .map_err(|e| WebhookRejection::BodyRead(e.to_string()))?;

    state.verifier.verify(&headers, &body).await?;

    let event = WebhookEvent::parse(&body).map_err(WebhookApiError::InvalidEvent)?;

    if !state
        .seen_events
        .set_if_absent(event.id.clone(), (), DUPLICATE_WINDOW)
    {
        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            "Duplicate webhook delivery acknowledged"
        );
        return Ok(StatusCode::OK);
    }

    tracing::info!(
        event_id = %event.id,
        event_type = %event.event_type,
        "Webhook accepted"
    );

    // Handler tasks run detached; their failures surface on the dispatcher's channel.
    state.dispatcher.dispatch(event).await;

    Ok(StatusCode::OK)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// Why a notification was not acknowledged.
///
/// Responses carry only a status code so a forger learns nothing about
/// which check failed.
#[derive(Debug)]
pub enum WebhookApiError {
    Rejected(WebhookRejection),
    /// Trusted body that is not a notification envelope.
    InvalidEvent(ValidationError),
}

impl From<WebhookRejection> for WebhookApiError {
    fn from(err: WebhookRejection) -> Self {
        Self::Rejected(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            WebhookApiError::Rejected(rejection) => {
                tracing::warn!(
                    kind = rejection.kind(),
                    retryable = rejection.is_retryable(),
                    error = %rejection,
                    "Webhook rejected"
                );
                rejection.status_code().into_response()
            }
            WebhookApiError::InvalidEvent(err) => {
                tracing::warn!(error = %err, "Verified webhook has malformed envelope");
                StatusCode::BAD_REQUEST.into_response()
            }
        }
    }
}
