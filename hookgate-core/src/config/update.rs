//! External update command configuration.

use crate::runner::UpdateCommand;
use std::path::PathBuf;

/// Interpreter used for the update script unless configured otherwise.
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Update command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateConfig {
    /// Path of the update script.
    pub script_path: PathBuf,
    /// Interpreter the script is passed to. `None` executes the script
    /// directly.
    pub shell: Option<PathBuf>,
}

impl UpdateConfig {
    pub fn new(script_path: impl Into<PathBuf>, shell: Option<PathBuf>) -> Self {
        Self {
            script_path: script_path.into(),
            shell,
        }
    }

    /// Build the command the runner executes.
    pub fn command(&self) -> UpdateCommand {
        UpdateCommand::script(&self.script_path, self.shell.as_deref())
    }
}
