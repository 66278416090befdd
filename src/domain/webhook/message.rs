//! Canonical verification message.
//!
//! The provider signs `transmission_id|transmission_time|webhook_id|checksum`
//! where `checksum` is the CRC-32 (IEEE) of the raw body. Sender and verifier
//! must produce this byte sequence identically, so it is built in exactly one
//! place.

use serde::Deserialize;

use super::TransmissionHeaders;

/// Computes the CRC-32 (IEEE polynomial) checksum of the raw body bytes.
pub fn crc32_checksum(body: &[u8]) -> u32 {
    crc32fast::hash(body)
}

/// How the body checksum is rendered inside the verification message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumFormat {
    /// Fixed-width, 8 character lowercase hexadecimal (`0000beef`).
    #[default]
    Hex,
    /// Unsigned decimal (`48879`).
    Decimal,
}

impl ChecksumFormat {
    pub fn render(&self, checksum: u32) -> String {
        match self {
            ChecksumFormat::Hex => format!("{:08x}", checksum),
            ChecksumFormat::Decimal => checksum.to_string(),
        }
    }
}

/// The exact payload covered by the transmission signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationMessage(String);

impl VerificationMessage {
    pub fn new(
        headers: &TransmissionHeaders,
        webhook_id: &str,
        body: &[u8],
        format: ChecksumFormat,
    ) -> Self {
        Self::from_parts(
            &headers.transmission_id,
            &headers.transmission_time,
            webhook_id,
            crc32_checksum(body),
            format,
        )
    }

    pub fn from_parts(
        transmission_id: &str,
        transmission_time: &str,
        webhook_id: &str,
        checksum: u32,
        format: ChecksumFormat,
    ) -> Self {
        Self(format!(
            "{}|{}|{}|{}",
            transmission_id,
            transmission_time,
            webhook_id,
            format.render(checksum)
        ))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
