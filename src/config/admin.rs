//! Admin API configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

const MIN_PRODUCTION_TOKEN_LEN: usize = 32;

/// Admin API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Bearer token required on admin endpoints
    pub token: SecretString,
}

impl AdminConfig {
    /// Validate admin configuration
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        let token = self.token.expose_secret();
        if token.trim().is_empty() {
            return Err(ValidationError::MissingRequired("ADMIN_TOKEN"));
        }
        if production && token.len() < MIN_PRODUCTION_TOKEN_LEN {
            return Err(ValidationError::WeakAdminToken(MIN_PRODUCTION_TOKEN_LEN));
        }
        Ok(())
    }
}
