//! Runtime configuration types for hookgate.
//!
//! These types represent the validated configuration used by the webhook
//! path. Loading and parsing is handled by the server crate.

mod update;
mod webhook;

pub use update::{DEFAULT_SHELL, UpdateConfig};
pub use webhook::WebhookConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared configuration state with separate locks for each section.
///
/// Both sections can be swapped at runtime (SIGHUP reload) while requests
/// hold independent read locks.
#[derive(Clone)]
pub struct SharedConfig {
    /// Secret and target branch.
    pub webhook: Arc<RwLock<WebhookConfig>>,
    /// External update command.
    pub update: Arc<RwLock<UpdateConfig>>,
}

impl SharedConfig {
    /// Create a new SharedConfig from individual configuration parts.
    pub fn new(webhook: WebhookConfig, update: UpdateConfig) -> Self {
        Self {
            webhook: Arc::new(RwLock::new(webhook)),
            update: Arc::new(RwLock::new(update)),
        }
    }

    /// Get a read lock on the webhook configuration.
    pub async fn webhook(&self) -> tokio::sync::RwLockReadGuard<'_, WebhookConfig> {
        self.webhook.read().await
    }

    /// Get a read lock on the update configuration.
    pub async fn update(&self) -> tokio::sync::RwLockReadGuard<'_, UpdateConfig> {
        self.update.read().await
    }

    /// Replace both sections.
    pub async fn replace(&self, webhook: WebhookConfig, update: UpdateConfig) {
        *self.webhook.write().await = webhook;
        *self.update.write().await = update;
    }
}
