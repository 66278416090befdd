//! Transmission headers attached to every provider notification.

use axum::http::HeaderMap;

use super::WebhookRejection;

pub const TRANSMISSION_ID_HEADER: &str = "paypal-transmission-id";
pub const TRANSMISSION_TIME_HEADER: &str = "paypal-transmission-time";
pub const TRANSMISSION_SIG_HEADER: &str = "paypal-transmission-sig";
pub const CERT_URL_HEADER: &str = "paypal-cert-url";

/// The four headers needed to establish a notification's authenticity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmissionHeaders {
    pub transmission_id: String,
    pub transmission_time: String,
    /// Base64-encoded signature over the verification message.
    pub signature: String,
    pub cert_url: String,
}

impl TransmissionHeaders {
    /// Extracts the transmission headers, checked in a fixed order.
    ///
    /// # Errors
    ///
    /// Returns `WebhookRejection::MissingHeader` naming the first header that
    /// is absent, empty, or not visible ASCII.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, WebhookRejection> {
        Ok(Self {
            transmission_id: required(headers, TRANSMISSION_ID_HEADER)?,
            transmission_time: required(headers, TRANSMISSION_TIME_HEADER)?,
            signature: required(headers, TRANSMISSION_SIG_HEADER)?,
            cert_url: required(headers, CERT_URL_HEADER)?,
        })
    }
}

fn required(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookRejection> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(WebhookRejection::MissingHeader(name))
}
