//! CredentialSource port - Obtains provider access credentials.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::PaymentError;

/// A bearer credential issued by the provider's token endpoint.
#[derive(Clone)]
pub struct Credential {
    pub access_token: SecretString,
    /// Authorization scheme, normally `Bearer`.
    pub token_type: String,
    pub scope: String,
    pub app_id: Option<String>,
    pub nonce: Option<String>,
    /// Lifetime reported by the provider at issue time.
    pub expires_in: Duration,
}

impl Credential {
    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token.expose_secret())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("app_id", &self.app_id)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Port for fetching a fresh credential from the provider.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn fetch_credential(&self) -> Result<Credential, PaymentError>;
}
