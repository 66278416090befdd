//! HTTP adapter for admin operations.
//!
//! - `POST /admin/funds/:fund_id/deactivate` - Deactivate a fund and cancel its subscriptions

pub mod dto;
mod handlers;
mod routes;

pub use dto::*;
pub use handlers::{deactivate_fund, AdminApiError, AdminAppState, AdminAuthorized};
pub use routes::admin_routes;
