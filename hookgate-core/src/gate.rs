//! Execution gate.
//!
//! The [`UpdateCoordinator`] owns the lock that serializes update runs.
//! At most one external process runs at a time; triggers that arrive while
//! a run is in progress wait for the lock and then run in turn. Nothing is
//! deduplicated: N accepted triggers produce N runs.
//!
//! The lock is a `tokio::sync::Mutex`, which is fair, so waiting triggers
//! run in the order they started waiting.
//!
//! Every finished run is published as a [`RunReport`] on a broadcast
//! channel. Runs are usually fire-and-forget, so this is the only way to
//! observe their completion.

use crate::runner::{RUN_ID_ENV, RunError, ScriptRunner, UpdateCommand};
use kanau::processor::Processor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use time::OffsetDateTime;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Buffer of the run report channel. Slow subscribers lag, runs never block.
const REPORT_CHANNEL_BUFFER: usize = 64;

/// Observable state of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Running,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    /// Exit code, or `None` when the process was killed by a signal.
    NonZeroExit(Option<i32>),
    LaunchFailed(String),
    WaitFailed(String),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded)
    }
}

impl From<&RunError> for RunOutcome {
    fn from(err: &RunError) -> Self {
        match err {
            RunError::Launch(e) => RunOutcome::LaunchFailed(e.to_string()),
            RunError::Wait(e) => RunOutcome::WaitFailed(e.to_string()),
            RunError::NonZeroExit(status) => RunOutcome::NonZeroExit(status.code()),
        }
    }
}

/// Published after every run, once the gate has been released.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    /// When the gate was acquired.
    pub started_at: OffsetDateTime,
    pub finished_at: OffsetDateTime,
    pub outcome: RunOutcome,
}

/// Owns the execution gate and the runner invoked under it.
///
/// Cheap to clone; clones share the same gate. Separate instances created
/// with [`new`](Self::new) are fully independent.
#[derive(Clone)]
pub struct UpdateCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    gate: Mutex<()>,
    runner: ScriptRunner,
    /// Set only while the gate is held. Readers never touch the gate.
    running: AtomicBool,
    pending: AtomicUsize,
    report_tx: broadcast::Sender<RunReport>,
}

/// Decrements the pending counter on every exit path.
struct PendingGuard<'a>(&'a AtomicUsize);

impl<'a> PendingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Clears the running flag on every exit path.
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl UpdateCoordinator {
    pub fn new(runner: ScriptRunner) -> Self {
        let (report_tx, _) = broadcast::channel(REPORT_CHANNEL_BUFFER);
        Self {
            inner: Arc::new(CoordinatorInner {
                gate: Mutex::new(()),
                runner,
                running: AtomicBool::new(false),
                pending: AtomicUsize::new(0),
                report_tx,
            }),
        }
    }

    /// Subscribe to reports of runs finishing after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<RunReport> {
        self.inner.report_tx.subscribe()
    }

    /// Whether a run currently holds the gate.
    ///
    /// Reads a flag maintained under the gate; never contends with runs.
    pub fn state(&self) -> GateState {
        if self.inner.running.load(Ordering::SeqCst) {
            GateState::Running
        } else {
            GateState::Idle
        }
    }

    /// Runs accepted but not yet finished, including the one running.
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::SeqCst)
    }

    /// Run `command` under the gate, in a detached task.
    ///
    /// Returns immediately. The outcome is only observable through
    /// [`subscribe`](Self::subscribe) and the logs.
    pub fn spawn_update(&self, command: UpdateCommand) {
        let coordinator = self.clone();
        tokio::spawn(async move {
            coordinator.run_update(command).await;
        });
    }

    /// Acquire the gate, run `command`, release the gate.
    ///
    /// The gate is released on every exit path, including launch failure.
    /// Failures are logged and reported, never returned as errors: by the
    /// time a run happens nobody is waiting for it.
    #[instrument(name = "hookgate.update", skip_all, fields(run_id = tracing::field::Empty))]
    pub async fn run_update(&self, command: UpdateCommand) -> RunReport {
        let run_id = Uuid::now_v7();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));

        let _pending = PendingGuard::enter(&self.inner.pending);

        debug!("Waiting for execution gate");
        let guard = self.inner.gate.lock().await;
        let running = RunningGuard::enter(&self.inner.running);
        let started_at = OffsetDateTime::now_utc();
        info!("Execution gate acquired, running update command");

        let result = self
            .inner
            .runner
            .process(command.env(RUN_ID_ENV, run_id.to_string()))
            .await;
        let finished_at = OffsetDateTime::now_utc();
        drop(running);
        drop(guard);

        let outcome = match &result {
            Ok(_) => {
                info!(elapsed = %(finished_at - started_at), "Update run succeeded");
                RunOutcome::Succeeded
            }
            Err(e) => {
                error!(error = %e, "Update run failed");
                RunOutcome::from(e)
            }
        };

        let report = RunReport {
            run_id,
            started_at,
            finished_at,
            outcome,
        };
        // Nobody listening is fine.
        let _ = self.inner.report_tx.send(report.clone());
        report
    }
}

impl Default for UpdateCoordinator {
    fn default() -> Self {
        Self::new(ScriptRunner::new())
    }
}
