//! Update runner.
//!
//! Runs the configured external command as a child process. The child
//! inherits the host's stdout and stderr, so its output shows up in real
//! time next to the server's own logs. The runner never serializes
//! anything itself: it is only ever invoked by
//! [`UpdateCoordinator`](crate::gate::UpdateCoordinator) while the gate is
//! held.

use kanau::processor::Processor;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Environment variable carrying the unique id of the current run.
pub const RUN_ID_ENV: &str = "HOOKGATE_RUN_ID";

/// Environment variable carrying the pushed reference that triggered the run.
pub const REF_ENV: &str = "HOOKGATE_REF";

/// Errors that can occur while running the update command.
#[derive(Debug, Error)]
pub enum RunError {
    /// The process could not be started.
    #[error("failed to launch update command: {0}")]
    Launch(#[source] std::io::Error),

    /// Waiting for the process failed.
    #[error("failed to wait for update command: {0}")]
    Wait(#[source] std::io::Error),

    /// The process ran but exited unsuccessfully.
    #[error("update command exited with {0}")]
    NonZeroExit(ExitStatus),
}

/// A fully resolved invocation of the update command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub envs: Vec<(String, String)>,
}

impl UpdateCommand {
    /// Run `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Run `script` through `shell`, or directly when no shell is given.
    pub fn script(script: &Path, shell: Option<&Path>) -> Self {
        match shell {
            Some(shell) => Self::new(shell).arg(script),
            None => Self::new(script),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add an environment variable for the child. Later values win.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

/// Executes [`UpdateCommand`]s as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptRunner;

impl ScriptRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Processor<UpdateCommand> for ScriptRunner {
    type Output = ExitStatus;
    type Error = RunError;

    #[tracing::instrument(skip_all, err, fields(program = %command.program.display()))]
    async fn process(&self, command: UpdateCommand) -> Result<ExitStatus, RunError> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(command.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let mut child = cmd.spawn().map_err(RunError::Launch)?;
        debug!(pid = ?child.id(), "Update command started");

        let status = child.wait().await.map_err(RunError::Wait)?;
        if !status.success() {
            return Err(RunError::NonZeroExit(status));
        }

        info!(%status, "Update command finished");
        Ok(status)
    }
}
