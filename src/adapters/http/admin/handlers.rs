//! HTTP handlers for admin endpoints.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Json, Path, State};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::application::handlers::fund::{
    DeactivateFundCommand, DeactivateFundError, DeactivateFundHandler,
};
use crate::domain::foundation::{ErrorCode, FundId};

use super::dto::{DeactivateFundResponse, ErrorResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct AdminAppState {
    pub deactivate_fund_handler: Arc<DeactivateFundHandler>,
    pub admin_token: SecretString,
}

impl AdminAppState {
    pub fn new(deactivate_fund_handler: Arc<DeactivateFundHandler>, admin_token: SecretString) -> Self {
        Self {
            deactivate_fund_handler,
            admin_token,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Authorization
// ════════════════════════════════════════════════════════════════════════════════

/// Marker extractor: the request carried the configured admin bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuthorized;

#[axum::async_trait]
impl FromRequestParts<AdminAppState> for AdminAuthorized {
    type Rejection = AdminApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AdminAppState,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(AdminApiError::Unauthorized)?;

        let expected = state.admin_token.expose_secret();
        if expected.is_empty() {
            return Err(AdminApiError::Unauthorized);
        }

        if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(AdminAuthorized)
        } else {
            Err(AdminApiError::Unauthorized)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /admin/funds/:fund_id/deactivate - Deactivate a fund
pub async fn deactivate_fund(
    State(state): State<AdminAppState>,
    _admin: AdminAuthorized,
    Path(fund_id): Path<String>,
) -> Result<impl IntoResponse, AdminApiError> {
    let fund_id: FundId = fund_id
        .parse()
        .map_err(|_| AdminApiError::InvalidFundId(fund_id))?;

    let result = state
        .deactivate_fund_handler
        .handle(DeactivateFundCommand { fund_id })
        .await?;

    Ok(Json(DeactivateFundResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts admin failures to HTTP responses.
#[derive(Debug)]
pub enum AdminApiError {
    Unauthorized,
    InvalidFundId(String),
    Deactivation(DeactivateFundError),
}

impl From<DeactivateFundError> for AdminApiError {
    fn from(err: DeactivateFundError) -> Self {
        Self::Deactivation(err)
    }
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match &self {
            AdminApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("ADMIN_TOKEN_REQUIRED", "A valid admin token is required"),
            ),
            AdminApiError::InvalidFundId(raw) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("INVALID_FUND_ID", format!("Invalid fund id: {}", raw)),
            ),
            AdminApiError::Deactivation(err) => deactivation_response(err),
        };

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error_code = %body.error_code,
                message = %body.message,
                "Fund deactivation failed"
            );
        }

        (status, Json(body)).into_response()
    }
}

fn deactivation_response(err: &DeactivateFundError) -> (StatusCode, ErrorResponse) {
    match err {
        DeactivateFundError::Store(e) if e.code == ErrorCode::FundNotFound => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new("FUND_NOT_FOUND", e.message.clone()),
        ),
        DeactivateFundError::Store(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(e.code.to_string(), e.message.clone()),
        ),
        DeactivateFundError::Cancellation(e) => (
            StatusCode::BAD_GATEWAY,
            ErrorResponse::with_details(
                "PROVIDER_ERROR",
                err.to_string(),
                json!({ "retryable": e.retryable, "provider_code": e.provider_code }),
            ),
        ),
        DeactivateFundError::ProviderTimeout(_) => (
            StatusCode::GATEWAY_TIMEOUT,
            ErrorResponse::new("PROVIDER_TIMEOUT", err.to_string()),
        ),
        DeactivateFundError::Compensation { fund_id, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::with_details(
                "COMPENSATION_FAILED",
                err.to_string(),
                json!({
                    "fund_id": fund_id.to_string(),
                    "inconsistent_subscriptions": err.inconsistent_subscriptions(),
                }),
            ),
        ),
    }
}
