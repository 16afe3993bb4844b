//! # Fluent task construction.
//!
//! [`Lifecycle`] wraps exactly one [`TaskRef`] and offers combinators that
//! wrap it further, plus [`Lifecycle::start`] to run it on a background
//! worker and drive it through the returned [`Started`] handle.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskframe::{Lifecycle, TaskError};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), TaskError> {
//! let poll = Lifecycle::from_fn("poll", |_ctx| async { Ok(()) })
//!     .repeat(Duration::from_millis(100))
//!     .swallow("poll", Duration::from_secs(1))
//!     .logged("poller");
//!
//! let running = poll.start();
//! tokio::time::sleep(Duration::from_millis(250)).await;
//! running.stop().await?;
//! running.join().await?;
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;

use crate::composite::{ParallelTask, SequenceTask};
use crate::decorators::{
    CloseAsRunTask, LoggingTask, RepeatingTask, SwallowTask, UnstoppableTask, WithClosingTask,
    WithoutCloseTask,
};
use crate::error::TaskError;
use crate::tasks::{FnTask, NoopTask, Task, TaskRef};

/// Builder-style wrapper around one task.
///
/// Not `Clone`: every combinator takes ownership, so a task ends up with
/// exactly one parent.
///
/// ```compile_fail
/// let task = taskframe::Lifecycle::noop();
/// let shared = task.clone();
/// ```
pub struct Lifecycle {
    task: TaskRef,
}

impl Lifecycle {
    /// Wraps a task value.
    pub fn new<T: Task>(task: T) -> Self {
        Self {
            task: Arc::new(task),
        }
    }

    /// Lifecycle that does nothing.
    pub fn noop() -> Self {
        Self::from(NoopTask::arc())
    }

    /// Lifecycle around a closure; see [`FnTask`].
    pub fn from_fn<F, Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self::new(FnTask::new(name, f))
    }

    /// Runs `children` one after another.
    pub fn sequence<I>(children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<TaskRef>,
    {
        Self::new(SequenceTask::new(children.into_iter().map(Into::into).collect()))
    }

    /// Runs `children` concurrently.
    pub fn parallel<I>(children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<TaskRef>,
    {
        Self::new(ParallelTask::new(children.into_iter().map(Into::into).collect()))
    }

    /// Runs `self`, then `next`.
    pub fn then(self, next: impl Into<TaskRef>) -> Self {
        Self::sequence([self.task, next.into()])
    }

    /// Repeats with a fixed `pause` until stopped.
    pub fn repeat(self, pause: Duration) -> Self {
        Self::new(RepeatingTask::new(self.task, pause))
    }

    /// Logs lifecycle transitions under `name`.
    pub fn logged(self, name: impl Into<String>) -> Self {
        Self::new(LoggingTask::new(self.task, name))
    }

    /// Logs and suppresses failures, pausing after each.
    pub fn swallow(self, label: impl Into<String>, pause: Duration) -> Self {
        Self::new(SwallowTask::new(self.task, label, pause))
    }

    /// Ignores `stop()`.
    pub fn unstoppable(self) -> Self {
        Self::new(UnstoppableTask::new(self.task))
    }

    /// Suppresses `close()`.
    pub fn without_close(self) -> Self {
        Self::new(WithoutCloseTask::new(self.task))
    }

    /// Turns `close()` into the main action.
    pub fn close_as_run(self) -> Self {
        Self::new(CloseAsRunTask::new(self.task))
    }

    /// Runs and closes `closing` after this task is closed.
    pub fn with_closing(self, closing: impl Into<TaskRef>) -> Self {
        Self::new(WithClosingTask::new(self.task, closing.into()))
    }

    /// Returns the wrapped task handle.
    pub fn into_ref(self) -> TaskRef {
        self.task
    }

    /// Runs the task on a background worker.
    ///
    /// Must be called within a tokio runtime. The worker inherits the
    /// caller's `tracing` dispatcher.
    pub fn start(self) -> Started {
        let task = self.task;
        let runner = Arc::clone(&task);
        let dispatch = tracing::dispatcher::get_default(|d| d.clone());
        let handle = tokio::spawn(async move { runner.run().await }.with_subscriber(dispatch));
        Started { task, handle }
    }
}

impl From<TaskRef> for Lifecycle {
    fn from(task: TaskRef) -> Self {
        Self { task }
    }
}

impl From<Lifecycle> for TaskRef {
    fn from(lifecycle: Lifecycle) -> Self {
        lifecycle.task
    }
}

#[async_trait]
impl Task for Lifecycle {
    fn name(&self) -> &str {
        self.task.name()
    }

    async fn run(&self) -> Result<(), TaskError> {
        self.task.run().await
    }

    async fn stop(&self) -> Result<(), TaskError> {
        self.task.stop().await
    }

    async fn close(&self) -> Result<(), TaskError> {
        self.task.close().await
    }
}

/// Handle to a task running on a background worker.
pub struct Started {
    task: TaskRef,
    handle: JoinHandle<Result<(), TaskError>>,
}

impl Started {
    /// Requests the task to stop; does not wait for it.
    pub async fn stop(&self) -> Result<(), TaskError> {
        self.task.stop().await
    }

    /// Returns `true` once the background `run()` has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the background `run()` and returns its result.
    ///
    /// A panic inside the task is reported as [`TaskError::Panicked`].
    pub async fn join(self) -> Result<(), TaskError> {
        match self.handle.await {
            Ok(res) => res,
            Err(e) if e.is_panic() => Err(TaskError::from_panic(e.into_panic())),
            Err(_) => Err(TaskError::Canceled),
        }
    }

    /// Stops the task and waits for it; the run error wins over the stop error.
    pub async fn stop_and_join(self) -> Result<(), TaskError> {
        let stopped = self.stop().await;
        self.join().await.and(stopped)
    }

    /// Returns the task handle, e.g. to close it after joining.
    pub fn task(&self) -> &TaskRef {
        &self.task
    }
}
