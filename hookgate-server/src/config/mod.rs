//! Configuration module for hookgate-server.
//!
//! Handles loading configuration from an optional TOML file, a `.env` file,
//! the process environment and CLI arguments, in increasing order of
//! precedence. Variables already set in the process environment are never
//! overridden by the `.env` file.
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `SERVER_PORT` | `8080` | HTTP listening port |
//! | `GITHUB_WEBHOOK_SECRET` | (none) | HMAC-SHA256 secret; without it every delivery is rejected |
//! | `GITHUB_BRANCH` | (required) | Branch whose pushes trigger an update |
//! | `UPDATE_SCRIPT_PATH` | (required) | Script run on every accepted push |
//! | `UPDATE_SCRIPT_SHELL` | `/bin/bash` | Interpreter for the script, empty to exec it directly |

pub mod env;
pub mod file;

use crate::config::env::{InMemoryEnv, ReadEnv, SystemEnv};
use crate::config::file::FileConfig;
use hookgate_core::config::{DEFAULT_SHELL, SharedConfig, UpdateConfig, WebhookConfig};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;

pub const PORT_ENV: &str = "SERVER_PORT";
pub const SECRET_ENV: &str = "GITHUB_WEBHOOK_SECRET";
pub const BRANCH_ENV: &str = "GITHUB_BRANCH";
pub const SCRIPT_PATH_ENV: &str = "UPDATE_SCRIPT_PATH";
pub const SHELL_ENV: &str = "UPDATE_SCRIPT_SHELL";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to read environment file: {0}")]
    DotenvError(#[from] dotenvy::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Server configuration. Fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub webhook: WebhookConfig,
    pub update: UpdateConfig,
}

impl LoadedConfig {
    /// Convert the reloadable sections into a [`SharedConfig`].
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig::new(self.webhook, self.update)
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader<E: ReadEnv = SystemEnv> {
    config_path: Option<PathBuf>,
    dotenv_path: Option<PathBuf>,
    listen_override: Option<SocketAddr>,
    env: E,
}

impl ConfigLoader<SystemEnv> {
    /// Create a new config loader reading the process environment.
    pub fn new(config_path: Option<&Path>, listen_override: Option<SocketAddr>) -> Self {
        Self::with_env(config_path, listen_override, SystemEnv)
    }
}

impl<E: ReadEnv> ConfigLoader<E> {
    pub fn with_env(
        config_path: Option<&Path>,
        listen_override: Option<SocketAddr>,
        env: E,
    ) -> Self {
        Self {
            config_path: config_path.map(Path::to_path_buf),
            dotenv_path: None,
            listen_override,
            env,
        }
    }

    /// Also read variables from a `.env` file, re-read on every load.
    ///
    /// A missing file is not an error.
    pub fn with_dotenv(mut self, path: impl Into<PathBuf>) -> Self {
        self.dotenv_path = Some(path.into());
        self
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file, if one was given
    /// 2. Read the `.env` file, if one was given and exists
    /// 3. Apply environment overrides
    /// 4. Apply CLI overrides
    /// 5. Validate the result
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let file_config = match &self.config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str(&content)?
            }
            None => FileConfig::default(),
        };

        let dotenv = self.read_dotenv()?;
        let loaded = self.merge(file_config, &dotenv)?;
        if !loaded.webhook.has_secret() {
            tracing::warn!(
                "No webhook secret configured ({SECRET_ENV}); every delivery will be rejected"
            );
        }
        Ok(loaded)
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn read_dotenv(&self) -> Result<InMemoryEnv, ConfigError> {
        let Some(path) = &self.dotenv_path else {
            return Ok(InMemoryEnv::new());
        };
        let entries = match dotenvy::from_path_iter(path) {
            Ok(entries) => entries,
            Err(e) if e.not_found() => {
                tracing::info!(path = %path.display(), "No environment file found");
                return Ok(InMemoryEnv::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut dotenv = InMemoryEnv::new();
        for entry in entries {
            let (key, value) = entry?;
            dotenv = dotenv.with(key, value);
        }
        tracing::info!(path = %path.display(), "Loaded environment file");
        Ok(dotenv)
    }

    fn merge(&self, file: FileConfig, dotenv: &InMemoryEnv) -> Result<LoadedConfig, ConfigError> {
        let env_var = |key: &str| self.env.var(key).or_else(|_| dotenv.var(key)).ok();

        // An empty port means unset, like a missing variable.
        let port = match env_var(PORT_ENV).filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                ConfigError::ValidationError(format!("{PORT_ENV} is not a valid port: {raw:?}"))
            })?,
            None => file.server.port.unwrap_or(DEFAULT_PORT),
        };
        let listen = self
            .listen_override
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)));

        let secret = env_var(SECRET_ENV)
            .or(file.webhook.secret)
            .unwrap_or_default();

        let branch = env_var(BRANCH_ENV)
            .or(file.webhook.branch)
            .unwrap_or_default();
        validate_branch(&branch)?;

        let script_path = env_var(SCRIPT_PATH_ENV)
            .map(PathBuf::from)
            .or(file.update.script_path)
            .unwrap_or_default();
        if script_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{SCRIPT_PATH_ENV} must be set"
            )));
        }

        let shell = env_var(SHELL_ENV)
            .or(file.update.shell)
            .unwrap_or_else(|| DEFAULT_SHELL.to_string());
        let shell = (!shell.is_empty()).then(|| PathBuf::from(shell));

        Ok(LoadedConfig {
            server: ServerConfig { listen },
            webhook: WebhookConfig::new(secret.into_bytes(), branch),
            update: UpdateConfig::new(script_path, shell),
        })
    }
}

fn validate_branch(branch: &str) -> Result<(), ConfigError> {
    if branch.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{BRANCH_ENV} must be set"
        )));
    }
    if branch.starts_with("refs/") {
        return Err(ConfigError::ValidationError(format!(
            "{BRANCH_ENV} is a branch name, not a ref: {branch:?}"
        )));
    }
    Ok(())
}
