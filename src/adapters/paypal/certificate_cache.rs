//! FileCertificateCache - Read-through disk cache for signing certificates.
//!
//! Each distinct certificate URL maps to one file,
//! `<dir>/<cache_key>-<sha256(url)[..16]>.pem`, so a certificate is
//! downloaded at most once per URL for as long as the directory survives.
//!
//! Concurrent first fetches of the same URL may both download; writes go to a
//! unique temporary file and are renamed into place, so readers never see a
//! partial certificate.
//!
//! Only bytes that parse as a certificate or public key are written. A cached
//! file that no longer parses is evicted and fetched again.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Url;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::webhook::{PublicKey, WebhookRejection};
use crate::ports::{CertificateError, CertificateSource};

/// Hosts PayPal serves signing certificates from.
pub const DEFAULT_ALLOWED_HOSTS: &[&str] = &["api.paypal.com", "api.sandbox.paypal.com"];

/// Largest certificate body accepted from the network.
pub const MAX_CERTIFICATE_BYTES: usize = 64 * 1024;

pub struct FileCertificateCache {
    http_client: reqwest::Client,
    dir: PathBuf,
    cache_key: String,
    allowed_hosts: Vec<String>,
}

impl FileCertificateCache {
    pub fn new(
        http_client: reqwest::Client,
        dir: impl Into<PathBuf>,
        cache_key: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            dir: dir.into(),
            cache_key: cache_key.into(),
            allowed_hosts: DEFAULT_ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect(),
        }
    }

    /// Replaces the host allow-list. An empty list accepts any URL.
    pub fn with_allowed_hosts(mut self, hosts: Vec<String>) -> Self {
        self.allowed_hosts = hosts;
        self
    }

    /// File the certificate for `cert_url` is cached under.
    pub fn cache_path(&self, cert_url: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(cert_url.as_bytes()));
        self.dir
            .join(format!("{}-{}.pem", self.cache_key, &digest[..16]))
    }

    fn check_allowed(&self, cert_url: &str) -> Result<(), CertificateError> {
        if self.allowed_hosts.is_empty() {
            return Ok(());
        }

        let url = Url::parse(cert_url)
            .map_err(|e| CertificateError::Disallowed(format!("{}: {}", cert_url, e)))?;
        let host_allowed = url
            .host_str()
            .map(|host| self.allowed_hosts.iter().any(|allowed| allowed.eq_ignore_ascii_case(host)))
            .unwrap_or(false);

        if url.scheme() != "https" || !host_allowed {
            return Err(CertificateError::Disallowed(cert_url.to_string()));
        }
        Ok(())
    }

    async fn download(&self, cert_url: &str) -> Result<Vec<u8>, CertificateError> {
        let mut response = self
            .http_client
            .get(cert_url)
            .send()
            .await
            .map_err(|e| CertificateError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CertificateError::Fetch(format!(
                "{} returned {}",
                cert_url, status
            )));
        }

        if response
            .content_length()
            .is_some_and(|len| len > MAX_CERTIFICATE_BYTES as u64)
        {
            return Err(too_large(cert_url));
        }

        let mut pem = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| CertificateError::Fetch(e.to_string()))?
        {
            if pem.len() + chunk.len() > MAX_CERTIFICATE_BYTES {
                return Err(too_large(cert_url));
            }
            pem.extend_from_slice(&chunk);
        }
        Ok(pem)
    }

    async fn store(&self, path: &Path, pem: &[u8]) -> Result<(), CertificateError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let tmp = self.dir.join(format!(".{}.tmp", Uuid::new_v4()));
        tokio::fs::write(&tmp, pem).await?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

fn too_large(cert_url: &str) -> CertificateError {
    CertificateError::Fetch(format!(
        "{} exceeds {} bytes",
        cert_url, MAX_CERTIFICATE_BYTES
    ))
}

/// Fails only when the bytes are not a certificate at all. An unsupported key
/// type is still a well-formed certificate and is left for the verifier.
fn check_parseable(pem: &[u8]) -> Result<(), CertificateError> {
    match PublicKey::from_pem(pem) {
        Err(WebhookRejection::Certificate(reason)) => Err(CertificateError::Invalid(reason)),
        _ => Ok(()),
    }
}

#[async_trait]
impl CertificateSource for FileCertificateCache {
    async fn load_certificate(&self, cert_url: &str) -> Result<Vec<u8>, CertificateError> {
        self.check_allowed(cert_url)?;
        let path = self.cache_path(cert_url);

        match tokio::fs::read(&path).await {
            Ok(pem) => match check_parseable(&pem) {
                Ok(()) => return Ok(pem),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Evicting unparseable cached certificate");
                    if let Err(e) = tokio::fs::remove_file(&path).await {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to evict cached certificate");
                    }
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unreadable certificate cache entry");
            }
        }

        let pem = self.download(cert_url).await?;
        check_parseable(&pem)?;
        tracing::info!(cert_url, path = %path.display(), "Fetched signing certificate");

        if let Err(e) = self.store(&path, &pem).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to cache signing certificate");
        }

        Ok(pem)
    }
}
