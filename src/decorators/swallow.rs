//! # Failure containment.
//!
//! [`SwallowTask`] is the only component that drops failures. Each operation
//! of the child runs inside a catch-all; a failure (or panic) is logged and
//! followed by a pause, then the call returns `Ok(())`.
//!
//! The usual placement is around a [`RepeatingTask`](crate::RepeatingTask):
//! a misbehaving iteration is logged and retried after the pause instead of
//! killing the daemon loop.
//!
//! ```text
//! swallow(repeat(worker, 1s), "worker", 5s)
//!   └─ iteration fails ─► error!("worker: ...") ─► sleep 5s ─► Ok(())
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::error;

use crate::error::TaskError;
use crate::tasks::{Task, TaskRef, pause};

/// Logs and suppresses every failure of its child.
pub struct SwallowTask {
    inner: TaskRef,
    label: String,
    pause: Duration,
}

impl SwallowTask {
    /// Wraps `inner`; failures are logged under `label` and followed by `pause`.
    pub fn new(inner: TaskRef, label: impl Into<String>, pause: Duration) -> Self {
        Self {
            inner,
            label: label.into(),
            pause,
        }
    }

    async fn contain<F>(&self, op: &'static str, fut: F) -> Result<(), TaskError>
    where
        F: Future<Output = Result<(), TaskError>> + Send,
    {
        let res = AssertUnwindSafe(fut)
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(TaskError::from_panic(panic)));

        if let Err(e) = res {
            error!(
                task = %self.label,
                op,
                label = e.as_label(),
                error = %e,
                "{}: {op} failed; pausing {:?}",
                self.label,
                self.pause
            );
            pause(self.pause).await;
        }
        Ok(())
    }
}

#[async_trait]
impl Task for SwallowTask {
    fn name(&self) -> &str {
        &self.label
    }

    async fn run(&self) -> Result<(), TaskError> {
        self.contain("run", self.inner.run()).await
    }

    async fn stop(&self) -> Result<(), TaskError> {
        self.contain("stop", self.inner.stop()).await
    }

    async fn close(&self) -> Result<(), TaskError> {
        self.contain("close", self.inner.close()).await
    }
}
