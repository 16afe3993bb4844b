//! # Resource-sourced tasks.
//!
//! A [`Provider`] hands out a task through scoped acquisition: it acquires
//! the task, invokes the scope callback with it and releases it once the
//! callback's future completes. [`ProvidedTask`] runs the provided task inside
//! that scope, so the task never outlives the provider's own bookkeeping.
//!
//! ```text
//! ProvidedTask::run()
//!   └─► provider.provide(scope)
//!          ├─ acquire task
//!          ├─ scope(task) ─► active = task ─► task.run() ─► active = noop
//!          └─ release task (provider's responsibility, on every path)
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::TaskError;
use crate::tasks::task::{NoopTask, Task, TaskRef};

/// Callback a [`Provider`] invokes with the acquired task.
pub type Scope<'a> = &'a (dyn Fn(TaskRef) -> BoxFuture<'static, Result<(), TaskError>> + Send + Sync);

/// Scoped source of a task.
///
/// Implementations must release whatever they acquired after the scope's
/// future resolves, whether it succeeded or not, and return its result.
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    /// Acquires a task, runs `scope` with it, releases it.
    async fn provide(&self, scope: Scope<'_>) -> Result<(), TaskError>;
}

/// Runs a task obtained from a [`Provider`] within the provider's scope.
pub struct ProvidedTask<P> {
    provider: P,
    active: Arc<Mutex<TaskRef>>,
}

impl<P: Provider> ProvidedTask<P> {
    /// Creates a task backed by `provider`.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            active: Arc::new(Mutex::new(NoopTask::arc())),
        }
    }
}

fn swap_active(slot: &Mutex<TaskRef>, task: TaskRef) {
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = task;
}

#[async_trait]
impl<P: Provider> Task for ProvidedTask<P> {
    fn name(&self) -> &str {
        "provided"
    }

    async fn run(&self) -> Result<(), TaskError> {
        let active = Arc::clone(&self.active);
        let scope = move |task: TaskRef| {
            let active = Arc::clone(&active);
            async move {
                swap_active(&active, Arc::clone(&task));
                let res = task.run().await;
                swap_active(&active, NoopTask::arc());
                res
            }
            .boxed()
        };
        self.provider.provide(&scope).await
    }

    async fn stop(&self) -> Result<(), TaskError> {
        let task = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        task.stop().await
    }

    /// The provider releases what it acquired; nothing is held here.
    async fn close(&self) -> Result<(), TaskError> {
        Ok(())
    }
}
