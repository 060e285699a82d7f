//! Application state shared across all request handlers.

use hookgate_core::config::SharedConfig;
use hookgate_core::dispatcher::TriggerDispatcher;
use hookgate_core::gate::UpdateCoordinator;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Runtime configuration (can be reloaded via SIGHUP).
    pub config: SharedConfig,
    /// Routes matching pushes to the execution gate.
    pub dispatcher: TriggerDispatcher,
}

impl AppState {
    /// Create a new AppState with its own execution gate.
    pub fn new(config: SharedConfig) -> Self {
        Self::with_coordinator(config, UpdateCoordinator::default())
    }

    pub fn with_coordinator(config: SharedConfig, coordinator: UpdateCoordinator) -> Self {
        let dispatcher = TriggerDispatcher::new(config.clone(), coordinator);
        Self { config, dispatcher }
    }

    pub fn coordinator(&self) -> &UpdateCoordinator {
        self.dispatcher.coordinator()
    }
}
