//! Client that delivers signed push notifications.
//!
//! Useful for triggering a deployment by hand or from another service
//! without going through a forge.

use bytes::Bytes;
use reqwest::Client;
use url::Url;

use super::ClientError;
use crate::objects::{MessageResponse, PushEvent};
use crate::signature::{self, DELIVERY_HEADER, EVENT_HEADER, SIGNATURE_HEADER};

/// Typed HTTP client for `POST /webhook`.
///
/// Every request body is signed with `HMAC-SHA256(secret, body)` exactly as
/// a forge would sign it.
#[derive(Clone)]
pub struct WebhookClient {
    http: Client,
    base_url: Url,
    secret: Vec<u8>,
}

impl std::fmt::Debug for WebhookClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl WebhookClient {
    /// Create a new `WebhookClient`.
    ///
    /// * `base_url` – root URL of the hookgate server (e.g. `http://deploy.internal:8080`).
    /// * `secret` – the shared webhook secret.
    pub fn new(base_url: Url, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            secret: secret.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Deliver a `push` notification for `refs/heads/{branch}`.
    pub async fn push_branch(&self, branch: &str) -> Result<MessageResponse, ClientError> {
        let event = PushEvent::new(crate::objects::branch_ref(branch));
        let body = serde_json::to_vec(&event)?;
        self.deliver("push", body).await
    }

    /// Sign and deliver an arbitrary raw body under the given event type.
    pub async fn deliver(
        &self,
        event: &str,
        body: impl Into<Bytes>,
    ) -> Result<MessageResponse, ClientError> {
        let body: Bytes = body.into();
        let url = self.base_url.join("/webhook")?;

        let resp = self
            .http
            .post(url)
            .header(SIGNATURE_HEADER, signature::sign(&body, &self.secret))
            .header(EVENT_HEADER, event)
            .header(DELIVERY_HEADER, "hookgate-sdk")
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        parse_response(resp).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
