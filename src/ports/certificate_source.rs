//! CertificateSource port - Resolves the provider's signing certificate.

use async_trait::async_trait;
use thiserror::Error;

/// Why a signing certificate could not be resolved.
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("Certificate URL not allowed: {0}")]
    Disallowed(String),

    #[error("Certificate fetch failed: {0}")]
    Fetch(String),

    #[error("Certificate is not a parseable PEM key: {0}")]
    Invalid(String),

    #[error("Certificate cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Port for loading the PEM-encoded certificate named by a notification.
///
/// Implementations should fetch each distinct URL at most once per process
/// lifetime where caching is possible.
#[async_trait]
pub trait CertificateSource: Send + Sync {
    async fn load_certificate(&self, cert_url: &str) -> Result<Vec<u8>, CertificateError>;
}
