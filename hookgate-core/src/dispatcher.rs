//! Trigger dispatcher.
//!
//! Turns an authenticated push notification into either a queued update
//! run or nothing. The run itself is handed to the
//! [`UpdateCoordinator`] as a detached task, so the caller gets its answer
//! without waiting for the update command.

use crate::config::SharedConfig;
use crate::gate::UpdateCoordinator;
use crate::runner::REF_ENV;
use hookgate_sdk::objects::PushEvent;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Decision taken for one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The push targeted the configured branch; a run was queued.
    Queued,
    /// The push targeted another ref, or carried none.
    Ignored,
}

/// Errors that can occur while dispatching a notification.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid JSON payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// Routes push notifications for the configured branch to the gate.
#[derive(Clone)]
pub struct TriggerDispatcher {
    config: SharedConfig,
    coordinator: UpdateCoordinator,
}

impl TriggerDispatcher {
    pub fn new(config: SharedConfig, coordinator: UpdateCoordinator) -> Self {
        Self {
            config,
            coordinator,
        }
    }

    pub fn coordinator(&self) -> &UpdateCoordinator {
        &self.coordinator
    }

    /// Decide what to do with a verified request body.
    ///
    /// The branch and command are read from the current configuration on
    /// every call. A payload without a `ref` is ignored, a payload that is
    /// not a JSON object of the expected shape is an error.
    #[instrument(name = "hookgate.dispatch", skip_all, fields(git_ref = tracing::field::Empty))]
    pub async fn dispatch(&self, body: &[u8]) -> Result<Dispatch, DispatchError> {
        let event = PushEvent::from_slice(body)?;
        tracing::Span::current().record("git_ref", event.git_ref.as_str());

        let target_ref = self.config.webhook().await.target_ref();
        if event.git_ref != target_ref {
            debug!(%target_ref, "Push does not target the configured branch");
            return Ok(Dispatch::Ignored);
        }

        let command = self.config.update().await.command().env(REF_ENV, event.git_ref);
        self.coordinator.spawn_update(command);
        info!(pending = self.coordinator.pending(), "Update queued");
        Ok(Dispatch::Queued)
    }
}
