//! `POST /webhook` handler.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use hookgate_core::dispatcher::{Dispatch, DispatchError};
use hookgate_sdk::objects::{ErrorResponse, MessageResponse};
use hookgate_sdk::signature::{DELIVERY_HEADER, EVENT_HEADER};
use tracing::instrument;

use crate::api::extractors::VerifiedPush;
use crate::state::AppState;

/// `POST /webhook`: receive a signed push notification.
///
/// Answers as soon as the dispatch decision is made; a matching push only
/// queues the update run.
#[instrument(
    name = "hookgate.webhook",
    skip_all,
    fields(
        event = tracing::field::Empty,
        delivery = tracing::field::Empty,
    )
)]
pub(super) async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    VerifiedPush(body): VerifiedPush,
) -> Result<Json<MessageResponse>, WebhookApiError> {
    let span = tracing::Span::current();
    if let Some(event) = headers.get(EVENT_HEADER).and_then(|v| v.to_str().ok()) {
        span.record("event", event);
    }
    if let Some(delivery) = headers.get(DELIVERY_HEADER).and_then(|v| v.to_str().ok()) {
        span.record("delivery", delivery);
    }

    match state.dispatcher.dispatch(&body).await? {
        Dispatch::Queued => Ok(Json(MessageResponse::queued())),
        Dispatch::Ignored => Ok(Json(MessageResponse::ignored())),
    }
}

/// Errors that can occur in the webhook handler after authentication.
#[derive(Debug)]
pub(super) enum WebhookApiError {
    /// The body is not a JSON object of the expected shape.
    MalformedPayload(serde_json::Error),
}

impl From<DispatchError> for WebhookApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::MalformedPayload(e) => WebhookApiError::MalformedPayload(e),
        }
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        match self {
            WebhookApiError::MalformedPayload(e) => {
                tracing::warn!(error = %e, "Webhook payload is not valid JSON");
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::new(format!("invalid JSON payload: {e}"))),
                )
                    .into_response()
            }
        }
    }
}
