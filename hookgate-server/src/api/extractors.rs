//! Custom Axum extractors for request authentication.
//!
//! Provides `VerifiedPush`, which verifies the `X-Hub-Signature-256` header
//! against the raw request body. All cryptographic operations are delegated
//! to [`hookgate_sdk::signature`].

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hookgate_sdk::objects::ErrorResponse;
use hookgate_sdk::signature::{self, AuthError, SIGNATURE_HEADER};

use crate::state::AppState;

/// Upper bound on accepted request bodies.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// An Axum extractor that yields the raw request body once its signature
/// has been verified.
///
/// # Header format
///
/// ```text
/// X-Hub-Signature-256: sha256={hex_digest}
/// ```
///
/// The digest is `HMAC-SHA256(webhook_secret, raw_body)` over the bytes
/// exactly as received.
pub struct VerifiedPush(pub Bytes);

/// Errors that can occur during signature verification.
#[derive(Debug, thiserror::Error)]
pub enum VerifiedPushError {
    #[error("missing X-Hub-Signature-256 header")]
    MissingHeader,
    #[error("X-Hub-Signature-256 header is not visible ASCII")]
    InvalidHeader,
    #[error("failed to read request body")]
    BodyReadError,
    #[error("signature verification failed: {0}")]
    Verification(#[from] AuthError),
}

impl IntoResponse for VerifiedPushError {
    fn into_response(self) -> Response {
        // Authentication failures all look the same from outside.
        let (status, message) = match &self {
            VerifiedPushError::BodyReadError => {
                (StatusCode::BAD_REQUEST, "failed to read request body")
            }
            VerifiedPushError::MissingHeader
            | VerifiedPushError::InvalidHeader
            | VerifiedPushError::Verification(_) => (StatusCode::UNAUTHORIZED, "invalid signature"),
        };
        tracing::warn!(reason = %self, "Rejected webhook delivery");
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

impl FromRequest<AppState> for VerifiedPush {
    type Rejection = VerifiedPushError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let header_value = req
            .headers()
            .get(SIGNATURE_HEADER)
            .ok_or(VerifiedPushError::MissingHeader)?
            .to_str()
            .map_err(|_| VerifiedPushError::InvalidHeader)?
            .to_owned();

        let body = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|_| VerifiedPushError::BodyReadError)?;

        let webhook = state.config.webhook().await;
        signature::verify(&header_value, &body, webhook.secret_bytes())?;
        drop(webhook);

        Ok(VerifiedPush(body))
    }
}
