//! Axum router configuration for webhook endpoints.

use axum::{routing::post, Router};

use super::handlers::{receive_webhook, WebhookAppState};

/// Create the webhook router.
///
/// # Routes
///
/// ## Webhook Endpoints (no auth, signature verified)
/// - `POST /webhooks` - Handle PayPal notifications
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new().route("/webhooks", post(receive_webhook))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use crate::adapters::events::WebhookDispatcher;
    use crate::application::handlers::webhook::VerifyWebhookHandler;
    use crate::domain::foundation::DomainError;
    use crate::domain::webhook::fixtures::TestSigner;
    use crate::domain::webhook::{
        ChecksumFormat, VerificationMessage, WebhookEvent, WebhookEventType, CERT_URL_HEADER,
        TRANSMISSION_ID_HEADER, TRANSMISSION_SIG_HEADER, TRANSMISSION_TIME_HEADER,
    };
    use crate::ports::{CertificateError, CertificateSource, WebhookEventHandler};

    const WEBHOOK_ID: &str = "WH-CONFIG-1";
    const CERT_URL: &str = "https://api.paypal.com/v1/notifications/certs/CERT-1";

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct StaticCertificates(Vec<u8>);

    #[async_trait]
    impl CertificateSource for StaticCertificates {
        async fn load_certificate(&self, _cert_url: &str) -> Result<Vec<u8>, CertificateError> {
            Ok(self.0.clone())
        }
    }

    struct RecordingHandler(mpsc::UnboundedSender<String>);

    #[async_trait]
    impl WebhookEventHandler for RecordingHandler {
        async fn handle(&self, event: WebhookEvent) -> Result<(), DomainError> {
            let _ = self.0.send(event.id);
            Ok(())
        }

        fn event_types(&self) -> Vec<WebhookEventType> {
            vec![WebhookEventType::SubscriptionCancelled]
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    struct Harness {
        signer: TestSigner,
        app: Router,
        handled: mpsc::UnboundedReceiver<String>,
    }

    fn harness() -> Harness {
        let signer = TestSigner::ecdsa_p256();
        let verifier = VerifyWebhookHandler::new(
            Arc::new(StaticCertificates(signer.cert_pem.clone().into_bytes())),
            WEBHOOK_ID,
        );

        let (tx, handled) = mpsc::unbounded_channel();
        let (mut dispatcher, _failures) = WebhookDispatcher::new(4);
        dispatcher.register(Arc::new(RecordingHandler(tx)));

        let state = WebhookAppState::new(Arc::new(verifier), Arc::new(dispatcher))
            .with_body_limit(1024);
        let app = webhook_routes().with_state(state);

        Harness {
            signer,
            app,
            handled,
        }
    }

    fn cancelled_event(id: &str) -> String {
        json!({
            "id": id,
            "event_type": "BILLING.SUBSCRIPTION.CANCELLED",
            "resource": { "id": "I-SUB-1" }
        })
        .to_string()
    }

    fn signed_request(signer: &TestSigner, transmission_id: &str, body: String) -> Request<Body> {
        let message = VerificationMessage::from_parts(
            transmission_id,
            "2026-10-18T10:00:00Z",
            WEBHOOK_ID,
            crc32fast::hash(body.as_bytes()),
            ChecksumFormat::Hex,
        );
        let signature = signer.sign_b64(message.as_bytes());

        Request::builder()
            .method("POST")
            .uri("/webhooks")
            .header(TRANSMISSION_ID_HEADER, transmission_id)
            .header(TRANSMISSION_TIME_HEADER, "2026-10-18T10:00:00Z")
            .header(TRANSMISSION_SIG_HEADER, signature)
            .header(CERT_URL_HEADER, CERT_URL)
            .body(Body::from(body))
            .unwrap()
    }

    async fn next_handled(rx: &mut mpsc::UnboundedReceiver<String>) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .ok()
            .flatten()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn accepts_and_dispatches_signed_notification() {
        let mut h = harness();
        let request = signed_request(&h.signer, "T1", cancelled_event("WH-EVT-1"));

        let response = h.app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(next_handled(&mut h.handled).await.as_deref(), Some("WH-EVT-1"));
    }

    #[tokio::test]
    async fn duplicate_delivery_is_acknowledged_once() {
        let mut h = harness();

        for transmission in ["T1", "T2"] {
            let request = signed_request(&h.signer, transmission, cancelled_event("WH-EVT-1"));
            let response = h.app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert!(next_handled(&mut h.handled).await.is_some());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(h.handled.try_recv().is_err());
    }

    #[tokio::test]
    async fn tampered_body_is_unauthorized_and_not_dispatched() {
        let mut h = harness();
        let mut request = signed_request(&h.signer, "T1", cancelled_event("WH-EVT-1"));
        *request.body_mut() = Body::from(cancelled_event("WH-EVT-2"));

        let response = h.app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(h.handled.try_recv().is_err());
    }

    #[tokio::test]
    async fn missing_headers_are_bad_request() {
        let h = harness();
        let request = Request::builder()
            .method("POST")
            .uri("/webhooks")
            .body(Body::from(cancelled_event("WH-EVT-1")))
            .unwrap();

        let response = h.app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let h = harness();
        let request = signed_request(&h.signer, "T1", "x".repeat(4096));

        let response = h.app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn verified_body_without_envelope_is_bad_request() {
        let h = harness();
        let request = signed_request(&h.signer, "T1", "[1, 2, 3]".to_string());

        let response = h.app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
