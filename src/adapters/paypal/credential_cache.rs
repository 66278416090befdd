//! CredentialCache - Reuses one provider credential until it expires.
//!
//! Concurrent callers that miss at the same moment each fetch their own
//! credential; the last one written wins. Token issuance is idempotent at the
//! provider, so the only cost is an extra round trip.

use std::sync::Arc;

use async_trait::async_trait;

use crate::adapters::cache::ExpiringStore;
use crate::ports::{Credential, CredentialSource, PaymentError};

const TOKEN_KEY: &str = "paypal_token";

pub struct CredentialCache {
    store: ExpiringStore<&'static str, Credential>,
    source: Arc<dyn CredentialSource>,
}

impl CredentialCache {
    pub fn new(source: Arc<dyn CredentialSource>) -> Self {
        Self {
            store: ExpiringStore::new(),
            source,
        }
    }

    /// Returns the cached credential, fetching a fresh one on miss.
    ///
    /// A failed fetch is returned unchanged and nothing is cached.
    pub async fn get_token(&self) -> Result<Credential, PaymentError> {
        if let Some(credential) = self.store.get(&TOKEN_KEY) {
            return Ok(credential);
        }

        let credential = self.source.fetch_credential().await?;
        self.store
            .set(TOKEN_KEY, credential.clone(), credential.expires_in);

        Ok(credential)
    }

    /// Drops the cached credential so the next call refetches.
    pub fn invalidate(&self) {
        self.store.delete(&TOKEN_KEY);
    }
}

#[async_trait]
impl CredentialSource for CredentialCache {
    async fn fetch_credential(&self) -> Result<Credential, PaymentError> {
        self.get_token().await
    }
}
