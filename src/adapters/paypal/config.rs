//! PayPal REST API connection settings.

use std::time::Duration;

use secrecy::SecretString;

/// Default sandbox API base URL.
pub const SANDBOX_BASE_URL: &str = "https://api-m.sandbox.paypal.com";

/// Default outbound request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Credentials and endpoint for the PayPal REST API.
#[derive(Clone)]
pub struct PaypalApiConfig {
    pub(super) client_id: String,
    pub(super) client_secret: SecretString,
    pub(super) base_url: String,
    pub(super) request_timeout: Duration,
}

impl PaypalApiConfig {
    /// Create a configuration against the sandbox API.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            base_url: SANDBOX_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set a custom API base URL (live API, or a mock server in tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the shared HTTP client honouring the request timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
    }
}

impl std::fmt::Debug for PaypalApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaypalApiConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
