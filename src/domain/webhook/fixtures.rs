//! Test keys and certificates for webhook verification tests.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ring::rand::SystemRandom;
use ring::signature::{self as ring_sig, EcdsaKeyPair, Ed25519KeyPair};

use super::KeyAlgorithm;

/// Self-signed RSA-2048 certificate.
pub const RSA_CERT_PEM: &str = "\
-----BEGIN CERTIFICATE-----
MIIDDzCCAfegAwIBAgIUBDDYy97eBw2mPWEwFscYnlQPhdkwDQYJKoZIhvcNAQEL
BQAwFjEUMBIGA1UEAwwLcGF5cGFsLnRlc3QwIBcNMjYxMDE4MTEyMzAxWhgPMjEy
NjA5MjQxMTIzMDFaMBYxFDASBgNVBAMMC3BheXBhbC50ZXN0MIIBIjANBgkqhkiG
9w0BAQEFAAOCAQ8AMIIBCgKCAQEAuNgHRO0Vyl/v63r8H52h0A2F1N29GER/mYRo
B7AT3dCEcH9iev4I9/A4QHZJemqbNPwLOSljuJhh4kEk1ZWFLuIMjmmkvYYezVjM
0WYbeE3UnuFWX3RcShJYSkuB7V0lEoQdZwtsraXV6FP68+elQP421R+O1qnBiRX5
d1ECdjna1YujBCwXsMWgx/XI2VEJNfpS1q+EUxHoQz+5Zki3RbyfZNgRM050zZLm
38uNiMYsEA3j4LlejA7nOtSK9tYbiRJa8HsMPa3Rgz2ToSduYO1cXJsIXF1emIE3
XWO5SEp8XrKm1G5gGluIjLeiNDwrgIYVlYy6vlU83a+e6Id/yQIDAQABo1MwUTAd
BgNVHQ4EFgQUubrPysGgO+eNrptSQnR0B4aJ5XEwHwYDVR0jBBgwFoAUubrPysGg
O+eNrptSQnR0B4aJ5XEwDwYDVR0TAQH/BAUwAwEB/zANBgkqhkiG9w0BAQsFAAOC
AQEAOIN2fS5GLwOoQh2FuHb4QlArC1ga9x28R4a7QzRcaPf+G2l6gPRlIi/vrQQ+
ew3IBUZi3TBlM4yQbpPh3bTC1TulXajvwOwpnQRkY1bhr+yyaU5YcOyb+fyG8FWD
tHUbdqYN5I30YxPDVbWYmLriGElgqx/Pt6ga5a43s5+9pxn96bSSA8ynR7pxAQZQ
5L6Ptt6pjhEwWVoEZzDbopwAqqzwBuRwROeY2Fu6q6mmfL8u9f5Tf98MJDUDzXeW
Q/XDuTk0kHFBuL6Plsd3npOvR0upudY2TS9Yb3H0FtdO2b9xWS/BRhUQbfrA3ge0
sIP8qZmP5sDszAcHsD1Ysqp+dg==
-----END CERTIFICATE-----
";

/// Message signed with the private half of [`RSA_CERT_PEM`].
pub const RSA_SIGNED_MESSAGE: &str = "T1|TS1|W1|cbf43926";

/// PKCS#1 v1.5 / SHA-256 signature over [`RSA_SIGNED_MESSAGE`].
pub const RSA_SIGNATURE_B64: &str = "t9ztXtguWJo6QwZXT03R88mA7yowm3TJo9JuPXbFh6faPIySB8zjPDSqsorhg/+UZcSUv60LeCc7zzChcCQVLExwY/hmFhUe34tLzEHHaEWzgi1B8wqt19C72B1NLLqE7nTwEC+9kPzSSR+v1ne8T2omFgoaPQS+YoZNy2uocsMPoMfPP/FJmZq/PElBTbFs4swbVNr9WLaJnLHV9xLkSuU8IXpNdp70G+qC3k+kVgSFbdJN3HXyyPQSbc1UIrAZE8cx4Yc50DAwpD81L4jAj5UWuwGw5Y6Fksletxj2iRHdeWukvLJ9eUz8P6zrKIdcRShvT82fMUS5Owdefdwigw==";

/// A DSA public key, which the verifier does not support.
pub const DSA_PUBLIC_KEY_PEM: &str = "\
-----BEGIN PUBLIC KEY-----
MIIBvjCCATMGByqGSM44BAEwggEmAoGBAIYp9ESO3pcqwz1UyFkhVLOAO0sUYoNk
qjFfvtEhC533JuroHRy4L8TvgaARPSYot+B1nss0LFLyhVCrEUj//OSBPd2rpJiQ
Tjo28ciDXC2yR52OFrcT0EfiExGEdzA9I7NweJiPbu38nGKnwS6jLH/Pe9ksrnp9
+PGlUSf2lNOhAh0AgdHRnFkRvaDv1IGKjGhJd/Rvofb6v/tdTJMGgQKBgAb0Id6w
W2d5DfOkdGaLEXLkvyclh8+yXyrcAHXN+IVZSZQRkOAePU62oNSvtJkChNz+Vi6M
GjSZE7miX9/P9+6XGXb5Y29Sp0Nk5p5tHV+AX1N40ytdggr99N/0LtVaeE89S8Xg
HVzaoQKJQgNvv1tuRWHQHZeXjs5rBLppkvh+A4GEAAKBgCoPkdK/0tJPTa8B282S
uoqQMCUnVSjzaiE3jbbr/Eak/Iaw2t3IGCA9Y0jxdNom7V/Jn8Nzy+uk1EO+C2Z3
aRrANBQz6YiwCDqLdg6MQiGE45ds4ynonvxsm7mz5razQ1SQW/TUtMkQZoPhFhgH
zNGVI0RvDlGiBVNef6kpe/x6
-----END PUBLIC KEY-----
";

enum Signer {
    Ecdsa(EcdsaKeyPair),
    Ed25519(Ed25519KeyPair),
}

/// A freshly generated key pair with a matching self-signed certificate.
pub struct TestSigner {
    pub algorithm: KeyAlgorithm,
    pub cert_pem: String,
    pub public_key_pem: String,
    signer: Signer,
    rng: SystemRandom,
}

impl TestSigner {
    pub fn ecdsa_p256() -> Self {
        Self::ecdsa(
            &rcgen::PKCS_ECDSA_P256_SHA256,
            &ring_sig::ECDSA_P256_SHA256_ASN1_SIGNING,
            KeyAlgorithm::EcdsaP256,
        )
    }

    pub fn ecdsa_p384() -> Self {
        Self::ecdsa(
            &rcgen::PKCS_ECDSA_P384_SHA384,
            &ring_sig::ECDSA_P384_SHA384_ASN1_SIGNING,
            KeyAlgorithm::EcdsaP384,
        )
    }

    pub fn ed25519() -> Self {
        let key_pair = rcgen::KeyPair::generate_for(&rcgen::PKCS_ED25519).unwrap();
        let signer =
            Ed25519KeyPair::from_pkcs8_maybe_unchecked(&key_pair.serialize_der()).unwrap();
        Self::build(key_pair, Signer::Ed25519(signer), KeyAlgorithm::Ed25519)
    }

    fn ecdsa(
        cert_alg: &'static rcgen::SignatureAlgorithm,
        signing_alg: &'static ring_sig::EcdsaSigningAlgorithm,
        algorithm: KeyAlgorithm,
    ) -> Self {
        let key_pair = rcgen::KeyPair::generate_for(cert_alg).unwrap();
        let signer =
            EcdsaKeyPair::from_pkcs8(signing_alg, &key_pair.serialize_der(), &SystemRandom::new())
                .unwrap();
        Self::build(key_pair, Signer::Ecdsa(signer), algorithm)
    }

    fn build(key_pair: rcgen::KeyPair, signer: Signer, algorithm: KeyAlgorithm) -> Self {
        let cert = rcgen::CertificateParams::new(vec!["paypal.test".to_string()])
            .unwrap()
            .self_signed(&key_pair)
            .unwrap();

        Self {
            algorithm,
            cert_pem: cert.pem(),
            public_key_pem: key_pair.public_key_pem(),
            signer,
            rng: SystemRandom::new(),
        }
    }

    /// Signs `message` and returns the standard base64 encoding.
    pub fn sign_b64(&self, message: &[u8]) -> String {
        let signature = match &self.signer {
            Signer::Ecdsa(key) => key.sign(&self.rng, message).unwrap().as_ref().to_vec(),
            Signer::Ed25519(key) => key.sign(message).as_ref().to_vec(),
        };
        STANDARD.encode(signature)
    }
}
