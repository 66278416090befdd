//! Data Transfer Objects for admin endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::fund::DeactivateFundResult;

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Reconciliation summary for a deactivated fund.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeactivateFundResponse {
    pub fund_id: String,
    pub deactivated: usize,
    pub cancelled: Vec<String>,
    pub reactivated: Vec<String>,
}

impl From<DeactivateFundResult> for DeactivateFundResponse {
    fn from(result: DeactivateFundResult) -> Self {
        Self {
            fund_id: result.fund_id.to_string(),
            deactivated: result.deactivated,
            cancelled: result.cancelled,
            reactivated: result.reactivated,
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::FundId;

    #[test]
    fn response_carries_fund_id_as_string() {
        let fund_id = FundId::new();
        let response = DeactivateFundResponse::from(DeactivateFundResult {
            fund_id,
            deactivated: 2,
            cancelled: vec!["A".into()],
            reactivated: vec!["B".into()],
        });

        assert_eq!(response.fund_id, fund_id.to_string());
        assert_eq!(response.reactivated, vec!["B".to_string()]);
    }

    #[test]
    fn error_response_omits_empty_details() {
        let json = serde_json::to_value(ErrorResponse::new("FUND_NOT_FOUND", "gone")).unwrap();
        assert!(json.get("details").is_none());
        assert_eq!(json["error_code"], "FUND_NOT_FOUND");
    }
}
