//! OAuth2 client-credentials exchange against the PayPal token endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::ports::{Credential, CredentialSource, PaymentError, PaymentErrorCode};

use super::PaypalApiConfig;

const TOKEN_PATH: &str = "/v1/oauth2/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
    #[serde(default)]
    scope: String,
    #[serde(default)]
    app_id: Option<String>,
    #[serde(default)]
    nonce: Option<String>,
    expires_in: u64,
}

impl From<TokenResponse> for Credential {
    fn from(response: TokenResponse) -> Self {
        Credential {
            access_token: SecretString::new(response.access_token),
            token_type: response.token_type,
            scope: response.scope,
            app_id: response.app_id,
            nonce: response.nonce,
            expires_in: Duration::from_secs(response.expires_in),
        }
    }
}

/// Fetches a fresh access token on every call. Wrap it in a
/// [`CredentialCache`](super::CredentialCache) to reuse tokens.
pub struct TokenClient {
    config: PaypalApiConfig,
    http_client: reqwest::Client,
}

impl TokenClient {
    pub fn new(config: PaypalApiConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }
}

#[async_trait]
impl CredentialSource for TokenClient {
    async fn fetch_credential(&self) -> Result<Credential, PaymentError> {
        let url = format!("{}{}", self.config.base_url, TOKEN_PATH);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(
                &self.config.client_id,
                Some(self.config.client_secret.expose_secret()),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "PayPal token request failed");
                PaymentError::network(e.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            let error = token_error(status, &body);
            tracing::error!(
                status = %status,
                code = %error.code,
                retryable = error.retryable,
                body = %body,
                "PayPal token request rejected"
            );
            return Err(error);
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            PaymentError::new(
                PaymentErrorCode::InvalidResponse,
                format!("Failed to parse token response: {}", e),
            )
        })?;

        tracing::debug!(
            expires_in_secs = token.expires_in,
            app_id = ?token.app_id,
            "Fetched PayPal access token"
        );

        Ok(token.into())
    }
}

/// Throttling and server faults are transient; any other refusal means the
/// credentials themselves were not accepted.
fn token_error(status: StatusCode, body: &str) -> PaymentError {
    let code = match status {
        StatusCode::TOO_MANY_REQUESTS => PaymentErrorCode::RateLimitExceeded,
        s if s.is_server_error() => PaymentErrorCode::NetworkError,
        _ => PaymentErrorCode::AuthenticationError,
    };
    PaymentError::new(
        code,
        format!("token endpoint returned {}: {}", status.as_u16(), body),
    )
}
