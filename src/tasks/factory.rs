//! # Factory-built tasks.
//!
//! [`FactoryTask`] asks a [`TaskFactory`] for a fresh work task on every
//! `run()` and for a separate closing task on `close()`.
//!
//! ## Flow
//! ```text
//! run():   factory.work() ─► install as active ─► run ─► close (always) ─► active = noop
//! stop():  active.stop()   (noop placeholder when nothing runs)
//! close(): factory.closing() ─► run ─► close (always)
//! ```
//!
//! ## Rules
//! - The work task is closed even when its `run()` failed.
//! - The `run()` error takes precedence over the `close()` error.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::warn;

use crate::error::TaskError;
use crate::tasks::task::{NoopTask, Task, TaskRef};

/// Source of per-run work tasks and of the closing task.
pub trait TaskFactory: Send + Sync + 'static {
    /// Builds the task executed by one `run()`.
    fn work(&self) -> Result<TaskRef, TaskError>;

    /// Builds the task executed by `close()`. Defaults to a no-op.
    fn closing(&self) -> Result<TaskRef, TaskError> {
        Ok(NoopTask::arc())
    }
}

impl<F> TaskFactory for F
where
    F: Fn() -> Result<TaskRef, TaskError> + Send + Sync + 'static,
{
    fn work(&self) -> Result<TaskRef, TaskError> {
        self()
    }
}

/// Runs a factory-built task per `run()` and closes it afterwards.
pub struct FactoryTask<F> {
    factory: F,
    active: Mutex<TaskRef>,
}

impl<F: TaskFactory> FactoryTask<F> {
    /// Creates a task backed by `factory`.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            active: Mutex::new(NoopTask::arc()),
        }
    }

    fn install(&self, task: TaskRef) {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = task;
    }

    fn active(&self) -> TaskRef {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Runs `task` and always closes it; the run error wins.
pub(crate) async fn run_then_close(task: &TaskRef) -> Result<(), TaskError> {
    let ran = task.run().await;
    let closed = task.close().await;
    match (ran, closed) {
        (Err(e), Err(close_err)) => {
            warn!(task = task.name(), error = %close_err, "close failed after run failure");
            Err(e)
        }
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Ok(()), Ok(())) => Ok(()),
    }
}

#[async_trait]
impl<F: TaskFactory> Task for FactoryTask<F> {
    fn name(&self) -> &str {
        "factory"
    }

    async fn run(&self) -> Result<(), TaskError> {
        let work = self.factory.work()?;
        self.install(work.clone());
        let res = run_then_close(&work).await;
        self.install(NoopTask::arc());
        res
    }

    async fn stop(&self) -> Result<(), TaskError> {
        self.active().stop().await
    }

    async fn close(&self) -> Result<(), TaskError> {
        let closing = self.factory.closing()?;
        run_then_close(&closing).await
    }
}
