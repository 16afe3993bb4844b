//! # Daemon: runs a root task as the life of the process.
//!
//! The [`Daemon`] owns the root task, the [`DaemonLog`] sink and a
//! [`DaemonConfig`]. Process-wide state lives in the [`ProcessContext`]
//! passed to [`Daemon::run`].
//!
//! ## Startup sequence
//! ```text
//! run(ctx):
//!   1. pid_file configured and present  ─► Err(PidFileExists)   (nothing else touched)
//!   2. write pid file, ctx keeps the guard (removed when ctx drops)
//!   3. install DaemonLog dispatcher for the rest of the run (scoped)
//!   4. ctx.start_once:  detach stdin (+ stdout/stderr unless logging uses them)
//!   5.                  register SIGINT/SIGTERM ─► ctx.signals() latch
//!   6. spawn shutdown watcher: latch flips ─► task.stop()
//!      task.run() ─► task.close() (always) ─► state = Stopped
//! ```
//!
//! ## States
//! `NotStarted → Running → Stopped`, independent of the signal latch.
//!
//! ## Example
//! ```no_run
//! use std::time::Duration;
//! use taskframe::{Daemon, DaemonConfig, DaemonLog, Lifecycle, ProcessContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = ProcessContext::new();
//!     let task = Lifecycle::from_fn("tick", |_ctx| async { Ok(()) })
//!         .repeat(Duration::from_secs(1))
//!         .logged("ticker");
//!
//!     let daemon = Daemon::new(
//!         task,
//!         DaemonLog::stderr(),
//!         DaemonConfig::default().with_pid_file("/tmp/ticker.pid"),
//!     );
//!     daemon.run(&ctx).await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{debug, info, warn};

use crate::config::DaemonConfig;
use crate::core::context::ProcessContext;
use crate::core::log::DaemonLog;
use crate::core::pid_file::PidFile;
use crate::core::stdio;
use crate::error::DaemonError;
use crate::tasks::TaskRef;

/// Lifecycle state of a [`Daemon`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DaemonState {
    /// `run()` has not passed its preconditions yet.
    NotStarted,
    /// The root task is running.
    Running,
    /// `run()` returned.
    Stopped,
}

impl DaemonState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => DaemonState::NotStarted,
            1 => DaemonState::Running,
            _ => DaemonState::Stopped,
        }
    }
}

/// Process-level controller around a root task.
pub struct Daemon {
    task: TaskRef,
    log: DaemonLog,
    cfg: DaemonConfig,
    state: AtomicU8,
}

impl Daemon {
    /// Creates a daemon for `task`.
    pub fn new(task: impl Into<TaskRef>, log: DaemonLog, cfg: DaemonConfig) -> Self {
        Self {
            task: task.into(),
            log,
            cfg,
            state: AtomicU8::new(DaemonState::NotStarted as u8),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DaemonState {
        DaemonState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// The root task.
    pub fn task(&self) -> &TaskRef {
        &self.task
    }

    fn set_state(&self, state: DaemonState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Runs the startup sequence, then the root task until it returns.
    ///
    /// ### Errors
    /// - [`DaemonError::PidFileExists`] before anything else happens.
    /// - [`DaemonError::PidFile`], [`DaemonError::Stdio`],
    ///   [`DaemonError::Signals`] when process setup fails.
    /// - [`DaemonError::Task`] when the root task's `run()` (or, failing
    ///   that, its `close()`) fails.
    pub async fn run(&self, ctx: &ProcessContext) -> Result<(), DaemonError> {
        if let Some(path) = &self.cfg.pid_file {
            ctx.keep_pid_file(PidFile::create(path)?);
        }

        let dispatch = self.log.dispatch().clone();
        self.supervise(ctx).with_subscriber(dispatch).await
    }

    async fn supervise(&self, ctx: &ProcessContext) -> Result<(), DaemonError> {
        self.prepare_process(ctx)?;

        self.set_state(DaemonState::Running);
        info!(pid = std::process::id(), task = self.task.name(), "daemon started");

        let done = CancellationToken::new();
        let watcher = self.spawn_shutdown_watcher(ctx, &done);

        let ran = self.task.run().await;
        done.cancel();
        if let Err(e) = watcher.await {
            warn!(error = %e, "shutdown watcher did not complete");
        }
        let closed = self.task.close().await;

        self.set_state(DaemonState::Stopped);
        match (ran, closed) {
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    warn!(error = %close_err, "root task close failed after run failure");
                }
                warn!(label = e.as_label(), error = %e, "daemon stopped with failure");
                Err(e.into())
            }
            (Ok(()), Err(e)) => {
                warn!(label = e.as_label(), error = %e, "root task close failed");
                Err(e.into())
            }
            (Ok(()), Ok(())) => {
                info!("daemon stopped");
                Ok(())
            }
        }
    }

    /// One-time process mutation: detach streams, register signals.
    fn prepare_process(&self, ctx: &ProcessContext) -> Result<(), DaemonError> {
        let close_streams = self.cfg.close_std_streams;
        let keep_output = self.log.uses_std_streams();
        let handle_signals = self.cfg.handle_signals;
        let signals = Arc::clone(ctx.signals());

        let first = ctx.start_once(|| {
            if close_streams {
                stdio::detach(keep_output).map_err(DaemonError::Stdio)?;
            }
            if handle_signals {
                signals.register().map_err(DaemonError::Signals)?;
            }
            Ok(())
        })?;
        if !first {
            debug!("process already prepared; skipping stream and signal setup");
        }
        Ok(())
    }

    /// Stops the root task once the latch flips; exits when `done` fires.
    fn spawn_shutdown_watcher(
        &self,
        ctx: &ProcessContext,
        done: &CancellationToken,
    ) -> JoinHandle<()> {
        let signals = Arc::clone(ctx.signals());
        let task = Arc::clone(&self.task);
        let done = done.clone();
        let grace = self.cfg.grace();
        let dispatch = tracing::dispatcher::get_default(|d| d.clone());

        let watcher = async move {
            tokio::select! {
                _ = signals.wait() => {}
                _ = done.cancelled() => return,
            }
            info!("shutdown requested; stopping root task");
            if let Err(e) = task.stop().await {
                warn!(label = e.as_label(), error = %e, "root task stop failed");
            }
            if let Some(grace) = grace {
                tokio::select! {
                    _ = tokio::time::sleep(grace) => {
                        warn!(?grace, "root task still running after shutdown grace");
                    }
                    _ = done.cancelled() => {}
                }
            }
        };
        tokio::spawn(watcher.with_subscriber(dispatch))
    }
}
