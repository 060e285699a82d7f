//! HTTP API.
//!
//! # Endpoints
//!
//! - `POST /webhook` – receive a signed push notification

use axum::{Router, routing::post};

use crate::state::AppState;

pub mod extractors;
mod webhook;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", post(webhook::receive_webhook))
}
