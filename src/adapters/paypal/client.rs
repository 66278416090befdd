//! Authorized PayPal REST client.
//!
//! Every request carries `Authorization: <token_type> <access_token>` from
//! the shared [`CredentialCache`]. Error bodies in PayPal's standard shape are
//! decoded into [`PaymentError`], with the most specific issue code kept as
//! `provider_code`.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ports::{PaymentError, PaymentErrorCode};

use super::CredentialCache;

/// PayPal's standard error body.
#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Vec<ProviderErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    issue: String,
    #[serde(default)]
    description: Option<String>,
}

pub struct PaypalClient {
    base_url: String,
    http_client: reqwest::Client,
    credentials: Arc<CredentialCache>,
}

impl PaypalClient {
    pub fn new(
        base_url: impl Into<String>,
        http_client: reqwest::Client,
        credentials: Arc<CredentialCache>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
            credentials,
        }
    }

    /// POSTs `body` as JSON to `path` and decodes the response.
    ///
    /// An empty response body (e.g. `204 No Content`) decodes as JSON `null`,
    /// so `T = ()` accepts it.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, PaymentError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    /// GETs `path` and decodes the JSON response.
    pub async fn get_json<T>(&self, path: &str) -> Result<T, PaymentError>
    where
        T: DeserializeOwned,
    {
        self.send::<(), T>(Method::GET, path, None).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, PaymentError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let credential = self.credentials.get_token().await?;
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .http_client
            .request(method.clone(), &url)
            .header(reqwest::header::AUTHORIZATION, credential.authorization_header());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(method = %method, path, error = %e, "PayPal request failed");
            PaymentError::network(e.to_string())
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                self.credentials.invalidate();
            }
            return Err(error_from_response(status, &bytes));
        }

        let bytes: &[u8] = if bytes.is_empty() { b"null" } else { &bytes[..] };
        serde_json::from_slice(bytes).map_err(|e| {
            PaymentError::new(
                PaymentErrorCode::InvalidResponse,
                format!("Failed to parse PayPal response: {}", e),
            )
        })
    }
}

/// Maps a non-success PayPal response to a [`PaymentError`].
pub(super) fn error_from_response(status: StatusCode, body: &[u8]) -> PaymentError {
    let parsed: ProviderErrorBody = serde_json::from_slice(body).unwrap_or_default();

    let code = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PaymentErrorCode::AuthenticationError,
        StatusCode::NOT_FOUND => PaymentErrorCode::NotFound,
        StatusCode::TOO_MANY_REQUESTS => PaymentErrorCode::RateLimitExceeded,
        s if s.is_server_error() => PaymentErrorCode::NetworkError,
        _ => PaymentErrorCode::ProviderError,
    };

    let detail = parsed.details.first();
    let message = detail
        .and_then(|d| d.description.clone())
        .or(parsed.message)
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());

    let error = PaymentError::new(code, format!("PayPal API error ({}): {}", status.as_u16(), message));
    match detail.map(|d| d.issue.clone()).or(parsed.name) {
        Some(provider_code) => error.with_provider_code(provider_code),
        None => error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{Credential, CredentialSource};
    use async_trait::async_trait;
    use secrecy::SecretString;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StaticSource(AtomicUsize);

    #[async_trait]
    impl CredentialSource for StaticSource {
        async fn fetch_credential(&self) -> Result<Credential, PaymentError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Credential {
                access_token: SecretString::new("tok".to_string()),
                token_type: "Bearer".to_string(),
                scope: String::new(),
                app_id: None,
                nonce: None,
                expires_in: Duration::from_secs(3600),
            })
        }
    }

    fn client_for(server: &MockServer) -> (PaypalClient, Arc<StaticSource>) {
        let source = Arc::new(StaticSource(AtomicUsize::new(0)));
        let cache = Arc::new(CredentialCache::new(source.clone()));
        (
            PaypalClient::new(server.uri(), reqwest::Client::new(), cache),
            source,
        )
    }

    #[tokio::test]
    async fn sends_authorization_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/billing/subscriptions/I-1"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "I-1" })))
            .expect(1)
            .mount(&server)
            .await;
        let (client, _) = client_for(&server);

        let body: Value = client.get_json("/v1/billing/subscriptions/I-1").await.unwrap();

        assert_eq!(body["id"], "I-1");
    }

    #[tokio::test]
    async fn empty_body_decodes_as_unit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/thing"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        let (client, _) = client_for(&server);

        let result: Result<(), _> = client.post_json("/v1/thing", &json!({})).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unauthorized_invalidates_cached_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/thing"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let (client, source) = client_for(&server);

        let first: Result<Value, _> = client.get_json("/v1/thing").await;
        let second: Result<Value, _> = client.get_json("/v1/thing").await;

        assert_eq!(first.unwrap_err().code, PaymentErrorCode::AuthenticationError);
        assert!(second.is_err());
        assert_eq!(source.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn error_body_keeps_first_issue_as_provider_code() {
        let body = json!({
            "name": "UNPROCESSABLE_ENTITY",
            "message": "The requested action could not be performed.",
            "details": [{
                "issue": "SUBSCRIPTION_STATUS_INVALID",
                "description": "Invalid subscription status for cancel action."
            }]
        });

        let err = error_from_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            body.to_string().as_bytes(),
        );

        assert_eq!(err.code, PaymentErrorCode::ProviderError);
        assert_eq!(err.provider_code.as_deref(), Some("SUBSCRIPTION_STATUS_INVALID"));
        assert!(err.message.contains("Invalid subscription status"));
    }

    #[test]
    fn non_json_error_body_is_kept_verbatim() {
        let err = error_from_response(StatusCode::BAD_GATEWAY, b"upstream down");
        assert_eq!(err.code, PaymentErrorCode::NetworkError);
        assert!(err.retryable);
        assert!(err.message.contains("upstream down"));
        assert!(err.provider_code.is_none());
    }
}
