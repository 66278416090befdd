//! Axum router configuration for admin endpoints.

use axum::{routing::post, Router};

use super::handlers::{deactivate_fund, AdminAppState};

/// Create the admin router.
///
/// # Routes
///
/// ## Admin Endpoints (require admin bearer token)
/// - `POST /admin/funds/:fund_id/deactivate` - Deactivate a fund and reconcile subscriptions
pub fn admin_routes() -> Router<AdminAppState> {
    Router::new().route("/admin/funds/:fund_id/deactivate", post(deactivate_fund))
}
