//! # Delegating task.
//!
//! [`DelegatingTask`] forwards every operation to whichever task is current
//! at call time. [`DelegatingTask::set`] swaps the current task, which makes
//! it a simple strategy switch.
//!
//! ## Rules
//! - The handle is cloned out of the lock before awaiting, so a `set()` never
//!   waits for a running operation.
//! - A `set()` racing with `run()` is the caller's responsibility: the run in
//!   progress keeps the old task, a `stop()` issued afterwards reaches the new
//!   one.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::task::{NoopTask, Task, TaskRef};

/// Forwards to a swappable current task.
pub struct DelegatingTask {
    current: Mutex<TaskRef>,
}

impl DelegatingTask {
    /// Creates a delegating task starting with `task`.
    pub fn new(task: TaskRef) -> Self {
        Self {
            current: Mutex::new(task),
        }
    }

    /// Replaces the current task, returning the previous one.
    pub fn set(&self, task: TaskRef) -> TaskRef {
        std::mem::replace(
            &mut *self.current.lock().unwrap_or_else(PoisonError::into_inner),
            task,
        )
    }

    /// Returns the current task.
    pub fn get(&self) -> TaskRef {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for DelegatingTask {
    fn default() -> Self {
        Self::new(NoopTask::arc())
    }
}

#[async_trait]
impl Task for DelegatingTask {
    fn name(&self) -> &str {
        "delegating"
    }

    async fn run(&self) -> Result<(), TaskError> {
        self.get().run().await
    }

    async fn stop(&self) -> Result<(), TaskError> {
        self.get().stop().await
    }

    async fn close(&self) -> Result<(), TaskError> {
        self.get().close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Journal, Probe};

    #[tokio::test]
    async fn run_uses_the_task_set_last() {
        let journal = Journal::default();
        let task = DelegatingTask::new(Probe::new("old", &journal).arc());

        let previous = task.set(Probe::new("new", &journal).arc());
        assert_eq!(previous.name(), "old");

        task.run().await.unwrap();
        assert_eq!(journal.entries(), vec!["new:run", "new:done"]);
    }

    #[tokio::test]
    async fn close_without_run_forwards() {
        let journal = Journal::default();
        let task = DelegatingTask::new(Probe::new("a", &journal).arc());
        task.close().await.unwrap();
        assert_eq!(journal.entries(), vec!["a:close"]);

        assert!(DelegatingTask::default().close().await.is_ok());
    }
}
