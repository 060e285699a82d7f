//! JSON bodies returned by the webhook endpoint.

use serde::{Deserialize, Serialize};

/// Message returned when a push matched the target branch.
pub const QUEUED_MESSAGE: &str = "Update process queued";

/// Message returned when a push targeted another branch.
pub const IGNORED_MESSAGE: &str = "Ignoring push to non-target branch";

/// Successful response: `{"message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn queued() -> Self {
        Self {
            message: QUEUED_MESSAGE.to_string(),
        }
    }

    pub fn ignored() -> Self {
        Self {
            message: IGNORED_MESSAGE.to_string(),
        }
    }

    pub fn is_queued(&self) -> bool {
        self.message == QUEUED_MESSAGE
    }
}

/// Error response: `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
