//! TOML file configuration structures.
//!
//! These structs directly map to the optional `hookgate.toml` file. Every
//! field is optional: environment variables fill in or override whatever
//! the file leaves out.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub webhook: WebhookConfig,
    pub update: UpdateConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on, on all interfaces.
    pub port: Option<u16>,
}

/// Webhook configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Shared secret configured on the forge side.
    pub secret: Option<String>,
    /// Branch whose pushes trigger an update, without `refs/heads/`.
    pub branch: Option<String>,
}

/// Update command configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Script run on every accepted push.
    pub script_path: Option<PathBuf>,
    /// Interpreter for the script. An empty string runs the script directly.
    pub shell: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
port = 9000

[webhook]
secret = "s3cr3t"
branch = "main"

[update]
script_path = "/srv/app/update.sh"
shell = "/bin/sh"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, Some(9000));
        assert_eq!(config.webhook.secret.as_deref(), Some("s3cr3t"));
        assert_eq!(config.webhook.branch.as_deref(), Some("main"));
        assert_eq!(
            config.update.script_path,
            Some(PathBuf::from("/srv/app/update.sh"))
        );
        assert_eq!(config.update.shell.as_deref(), Some("/bin/sh"));
    }

    #[test]
    fn test_sections_are_optional() {
        let config: FileConfig = toml::from_str("[webhook]\nbranch = \"main\"\n").unwrap();
        assert_eq!(config.server.port, None);
        assert_eq!(config.webhook.secret, None);
        assert_eq!(config.update.script_path, None);
    }
}
