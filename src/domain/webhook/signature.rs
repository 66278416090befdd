//! Public-key signature verification for provider notifications.
//!
//! The signing key arrives as a PEM document, either an X.509 certificate or
//! a bare SubjectPublicKeyInfo. Verification dispatches on the key algorithm:
//!
//! | Key        | Scheme                                   |
//! |------------|------------------------------------------|
//! | RSA        | PKCS#1 v1.5 with SHA-256                 |
//! | EC P-256   | ECDSA, ASN.1 signature, SHA-256          |
//! | EC P-384   | ECDSA, ASN.1 signature, SHA-384          |
//! | Ed25519    | Ed25519 over the raw message             |

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ring::signature::{self as ring_sig, UnparsedPublicKey, VerificationAlgorithm};
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::FromDer;
use x509_parser::x509::SubjectPublicKeyInfo;

use super::{VerificationMessage, WebhookRejection};

const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
const OID_ED25519: &str = "1.3.101.112";

// Uncompressed SEC1 points: 0x04 || X || Y
const P256_POINT_LEN: usize = 65;
const P384_POINT_LEN: usize = 97;

/// Key algorithms the verifier accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Rsa,
    EcdsaP256,
    EcdsaP384,
    Ed25519,
}

impl KeyAlgorithm {
    fn verification_algorithm(&self) -> &'static dyn VerificationAlgorithm {
        match self {
            KeyAlgorithm::Rsa => &ring_sig::RSA_PKCS1_2048_8192_SHA256,
            KeyAlgorithm::EcdsaP256 => &ring_sig::ECDSA_P256_SHA256_ASN1,
            KeyAlgorithm::EcdsaP384 => &ring_sig::ECDSA_P384_SHA384_ASN1,
            KeyAlgorithm::Ed25519 => &ring_sig::ED25519,
        }
    }
}

/// A public key extracted from the provider's signing certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    algorithm: KeyAlgorithm,
    key: Vec<u8>,
}

impl PublicKey {
    /// Parses a PEM `CERTIFICATE` or `PUBLIC KEY` block.
    ///
    /// # Errors
    ///
    /// - `Certificate` - the PEM or DER structure is malformed
    /// - `UnsupportedKeyType` - the key is neither RSA, P-256/P-384 ECDSA, nor Ed25519
    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self, WebhookRejection> {
        let (_, pem) = parse_x509_pem(pem_bytes)
            .map_err(|e| WebhookRejection::Certificate(format!("invalid PEM: {}", e)))?;

        match pem.label.as_str() {
            "CERTIFICATE" => {
                let cert = pem.parse_x509().map_err(|e| {
                    WebhookRejection::Certificate(format!("invalid certificate: {}", e))
                })?;
                Self::from_spki(cert.public_key())
            }
            "PUBLIC KEY" => {
                let (_, spki) = SubjectPublicKeyInfo::from_der(&pem.contents).map_err(|e| {
                    WebhookRejection::Certificate(format!("invalid public key: {}", e))
                })?;
                Self::from_spki(&spki)
            }
            other => Err(WebhookRejection::Certificate(format!(
                "unexpected PEM block: {}",
                other
            ))),
        }
    }

    fn from_spki(spki: &SubjectPublicKeyInfo<'_>) -> Result<Self, WebhookRejection> {
        let oid = spki.algorithm.algorithm.to_id_string();
        let key = spki.subject_public_key.data.to_vec();

        let algorithm = match oid.as_str() {
            OID_RSA_ENCRYPTION => KeyAlgorithm::Rsa,
            OID_ED25519 => KeyAlgorithm::Ed25519,
            OID_EC_PUBLIC_KEY => match key.len() {
                P256_POINT_LEN => KeyAlgorithm::EcdsaP256,
                P384_POINT_LEN => KeyAlgorithm::EcdsaP384,
                len => {
                    return Err(WebhookRejection::UnsupportedKeyType(format!(
                        "EC point of {} bytes",
                        len
                    )))
                }
            },
            other => return Err(WebhookRejection::UnsupportedKeyType(other.to_string())),
        };

        Ok(Self { algorithm, key })
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Verifies `signature` over the raw `message` bytes.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), WebhookRejection> {
        UnparsedPublicKey::new(self.algorithm.verification_algorithm(), &self.key)
            .verify(message, signature)
            .map_err(|_| WebhookRejection::SignatureInvalid)
    }
}

/// Decodes the standard-alphabet base64 transmission signature.
pub fn decode_signature(encoded: &str) -> Result<Vec<u8>, WebhookRejection> {
    STANDARD.decode(encoded.trim()).map_err(|e| {
        tracing::debug!(error = %e, "Transmission signature is not valid base64");
        WebhookRejection::SignatureInvalid
    })
}

/// Full signature check: decode, parse the key, dispatch on its algorithm.
pub fn verify_signature(
    pem_bytes: &[u8],
    message: &VerificationMessage,
    signature_b64: &str,
) -> Result<KeyAlgorithm, WebhookRejection> {
    let signature = decode_signature(signature_b64)?;
    let key = PublicKey::from_pem(pem_bytes)?;
    key.verify(message.as_bytes(), &signature)?;
    Ok(key.algorithm())
}
