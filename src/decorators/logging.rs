//! # Lifecycle logging.
//!
//! [`LoggingTask`] prints one line per lifecycle transition of its child and
//! otherwise stays out of the way: failures propagate unchanged.
//!
//! ## Output format
//! ```text
//! worker: started
//! worker: finished
//! worker: exiting...
//! worker: closing...
//! worker: closed
//! ```

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::TaskError;
use crate::tasks::{Task, TaskRef};

/// Logs run/stop/close transitions of its child.
pub struct LoggingTask {
    inner: TaskRef,
    name: String,
}

impl LoggingTask {
    /// Wraps `inner`, logging under `name`.
    pub fn new(inner: TaskRef, name: impl Into<String>) -> Self {
        Self {
            inner,
            name: name.into(),
        }
    }
}

#[async_trait]
impl Task for LoggingTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<(), TaskError> {
        info!("{}: started", self.name);
        let res = self.inner.run().await;
        match &res {
            Ok(()) => info!("{}: finished", self.name),
            Err(e) => warn!(label = e.as_label(), "{}: failed: {e}", self.name),
        }
        res
    }

    async fn stop(&self) -> Result<(), TaskError> {
        info!("{}: exiting...", self.name);
        self.inner.stop().await
    }

    async fn close(&self) -> Result<(), TaskError> {
        info!("{}: closing...", self.name);
        let res = self.inner.close().await;
        match &res {
            Ok(()) => info!("{}: closed", self.name),
            Err(e) => warn!(label = e.as_label(), "{}: close failed: {e}", self.name),
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Captured, Journal, Probe};
    use tracing::instrument::WithSubscriber;

    #[tokio::test]
    async fn transitions_are_logged_in_order() {
        let journal = Journal::default();
        let logs = Captured::default();
        let task = LoggingTask::new(Probe::new("p", &journal).arc(), "worker");

        async {
            task.run().await.unwrap();
            task.stop().await.unwrap();
            task.close().await.unwrap();
        }
        .with_subscriber(logs.dispatch())
        .await;

        let text = logs.text();
        let order = [
            "worker: started",
            "worker: finished",
            "worker: exiting...",
            "worker: closing...",
            "worker: closed",
        ];
        let mut from = 0;
        for line in order {
            let at = text[from..].find(line).unwrap_or_else(|| panic!("missing {line:?} in {text}"));
            from += at + line.len();
        }
        assert_eq!(journal.entries(), vec!["p:run", "p:done", "p:stop", "p:close"]);
    }

    #[tokio::test]
    async fn failures_propagate_unchanged() {
        let journal = Journal::default();
        let logs = Captured::default();
        let task = LoggingTask::new(Probe::new("p", &journal).failing_run().arc(), "worker");

        let res = task.run().with_subscriber(logs.dispatch()).await;
        assert!(matches!(res, Err(TaskError::Fail { .. })));
        assert!(!logs.text().contains("worker: finished"));
        assert!(logs.text().contains("worker: failed"));
    }
}
