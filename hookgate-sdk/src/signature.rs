//! Signature algorithm and verification for push notifications.
//!
//! Forges sign every delivery with the shared webhook secret. The wire
//! format for the header is:
//!
//! ```text
//! X-Hub-Signature-256: sha256={hex_digest}
//! ```
//!
//! where `hex_digest` is the lowercase hex encoding of
//! `HMAC-SHA256(secret, raw_body)`. The digest always covers the exact bytes
//! received on the wire, never a re-serialization of the parsed payload.

use subtle::ConstantTimeEq;

/// Header name for the HMAC signature.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

/// Header name carrying the forge event type (`push`, `ping`, ...).
pub const EVENT_HEADER: &str = "X-GitHub-Event";

/// Header name carrying the forge delivery id.
pub const DELIVERY_HEADER: &str = "X-GitHub-Delivery";

/// The only algorithm prefix accepted in [`SIGNATURE_HEADER`].
pub const SIGNATURE_ALGORITHM: &str = "sha256";

/// Errors produced by signature verification.
///
/// Callers facing the network must not reveal which variant occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("signature header is not of the form <algorithm>=<digest>")]
    MalformedHeader,
    #[error("unsupported signature algorithm")]
    UnsupportedAlgorithm,
    #[error("signature mismatch")]
    SignatureMismatch,
    #[error("no webhook secret configured")]
    MissingSecret,
}

/// Verify a `sha256=<hex>` header value against the raw request body.
///
/// The expected digest is hex-encoded and compared to the supplied digest
/// as ASCII bytes in constant time, so both sides share one representation.
/// An empty secret never verifies.
pub fn verify(header_value: &str, body: &[u8], secret: &[u8]) -> Result<(), AuthError> {
    let (algorithm, digest_hex) = parse_signature_header(header_value)?;

    if algorithm != SIGNATURE_ALGORITHM {
        return Err(AuthError::UnsupportedAlgorithm);
    }
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let expected = hex_digest(body, secret);
    if bool::from(expected.as_bytes().ct_eq(digest_hex.as_bytes())) {
        Ok(())
    } else {
        Err(AuthError::SignatureMismatch)
    }
}

/// Compute the canonical header value `sha256=<hex>` for `body`.
pub fn sign(body: &[u8], secret: &[u8]) -> String {
    format!("{SIGNATURE_ALGORITHM}={}", hex_digest(body, secret))
}

/// Split a header value on its first `=` into `(algorithm, digest)`.
///
/// Both parts must be non-empty.
pub fn parse_signature_header(value: &str) -> Result<(&str, &str), AuthError> {
    match value.split_once('=') {
        Some((algorithm, digest)) if !algorithm.is_empty() && !digest.is_empty() => {
            Ok((algorithm, digest))
        }
        _ => Err(AuthError::MalformedHeader),
    }
}

fn hex_digest(body: &[u8], secret: &[u8]) -> String {
    let key = ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret);
    hex::encode(ring::hmac::sign(&key, body).as_ref())
}
