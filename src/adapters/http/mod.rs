//! HTTP adapters - REST API implementations.
//!
//! - `POST /webhooks` - Provider notifications (signature verified)
//! - `POST /admin/funds/:fund_id/deactivate` - Fund deactivation (admin token)
//! - `GET /health` - Liveness

pub mod admin;
pub mod health;
pub mod webhooks;

use axum::Router;
use tower_http::trace::TraceLayer;

// Re-export key types for convenience
pub use admin::{admin_routes, AdminAppState};
pub use health::health_routes;
pub use webhooks::{webhook_routes, WebhookAppState};

/// Builds the complete application router with request tracing.
pub fn app_router(webhooks: WebhookAppState, admin: AdminAppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(webhook_routes().with_state(webhooks))
        .merge(admin_routes().with_state(admin))
        .layer(TraceLayer::new_for_http())
}
