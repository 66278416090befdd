//! PayPal configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::paypal::{PaypalApiConfig, DEFAULT_ALLOWED_HOSTS, SANDBOX_BASE_URL};
use crate::domain::webhook::ChecksumFormat;

/// PayPal configuration (REST credentials + webhook verification)
#[derive(Debug, Clone, Deserialize)]
pub struct PaypalConfig {
    /// REST app client id
    pub client_id: String,

    /// REST app client secret
    pub client_secret: SecretString,

    /// API base URL (sandbox unless overridden)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Webhook id assigned by PayPal; part of every signed message
    pub webhook_id: String,

    /// Directory holding downloaded signing certificates
    #[serde(default = "default_cert_cache_dir")]
    pub cert_cache_dir: PathBuf,

    /// File name prefix for cached certificates
    #[serde(default = "default_cert_cache_key")]
    pub cert_cache_key: String,

    /// Hosts allowed in `paypal-cert-url` (comma-separated). Unset means the
    /// PayPal API hosts; an empty value disables the check.
    pub allowed_cert_hosts: Option<String>,

    /// How the body CRC-32 is rendered in the signed message
    #[serde(default)]
    pub checksum_format: ChecksumFormat,

    /// Outbound request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Upper bound on a whole cancellation batch, in seconds
    #[serde(default = "default_cancel_timeout")]
    pub cancel_timeout_secs: u64,
}

impl PaypalConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cancel_timeout(&self) -> Duration {
        Duration::from_secs(self.cancel_timeout_secs)
    }

    /// Get allowed certificate hosts as a vector
    pub fn allowed_cert_hosts_list(&self) -> Vec<String> {
        match &self.allowed_cert_hosts {
            None => DEFAULT_ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect(),
            Some(hosts) => hosts
                .split(',')
                .map(|h| h.trim().to_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// Check if pointed at the sandbox API
    pub fn is_sandbox(&self) -> bool {
        self.base_url.contains(".sandbox.")
    }

    /// Connection settings for the REST adapters.
    pub fn api_config(&self) -> PaypalApiConfig {
        PaypalApiConfig::new(&self.client_id, self.client_secret.expose_secret().as_str())
            .with_base_url(&self.base_url)
            .with_request_timeout(self.request_timeout())
    }

    /// Validate PayPal configuration
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.client_id.is_empty() {
            return Err(ValidationError::MissingRequired("PAYPAL_CLIENT_ID"));
        }
        if self.client_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYPAL_CLIENT_SECRET"));
        }
        if self.webhook_id.is_empty() {
            return Err(ValidationError::MissingRequired("PAYPAL_WEBHOOK_ID"));
        }
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(ValidationError::InvalidPaypalBaseUrl);
        }
        if production && !self.base_url.starts_with("https://") {
            return Err(ValidationError::PaypalBaseUrlMustBeHttps);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.cancel_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for PaypalConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: SecretString::new(String::new()),
            base_url: default_base_url(),
            webhook_id: String::new(),
            cert_cache_dir: default_cert_cache_dir(),
            cert_cache_key: default_cert_cache_key(),
            allowed_cert_hosts: None,
            checksum_format: ChecksumFormat::default(),
            request_timeout_secs: default_request_timeout(),
            cancel_timeout_secs: default_cancel_timeout(),
        }
    }
}

fn default_base_url() -> String {
    SANDBOX_BASE_URL.to_string()
}

fn default_cert_cache_dir() -> PathBuf {
    std::env::temp_dir().join("boardfund-certs")
}

fn default_cert_cache_key() -> String {
    "paypal-cert".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_cancel_timeout() -> u64 {
    60
}
