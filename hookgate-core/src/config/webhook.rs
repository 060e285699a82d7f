//! Webhook authentication and branch targeting.

use hookgate_sdk::objects::branch_ref;

/// Webhook configuration.
#[derive(Clone)]
pub struct WebhookConfig {
    /// Shared secret bytes for HMAC verification. May be empty, in which
    /// case every delivery is rejected.
    pub secret: Box<[u8]>,
    /// Branch name whose pushes trigger an update (without `refs/heads/`).
    pub branch: String,
}

impl WebhookConfig {
    /// Create a new WebhookConfig.
    pub fn new(secret: impl Into<Box<[u8]>>, branch: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            branch: branch.into(),
        }
    }

    /// Get the secret key bytes for HMAC verification.
    pub fn secret_bytes(&self) -> &[u8] {
        &self.secret
    }

    pub fn has_secret(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Full reference a push must carry, e.g. `refs/heads/main`.
    pub fn target_ref(&self) -> String {
        branch_ref(&self.branch)
    }
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("secret", &"<redacted>")
            .field("branch", &self.branch)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let config = WebhookConfig::new(b"hunter2".to_vec(), "main");
        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("main"));
    }

    #[test]
    fn test_target_ref() {
        let config = WebhookConfig::new(Vec::new(), "main");
        assert_eq!(config.target_ref(), "refs/heads/main");
        assert!(!config.has_secret());
    }
}
