//! # Small single-child decorators.
//!
//! Each wrapper changes exactly one operation of its child:
//!
//! | Wrapper             | run              | stop        | close                        |
//! |---------------------|------------------|-------------|------------------------------|
//! | [`UnstoppableTask`] | forward          | no-op       | forward                      |
//! | [`WithoutCloseTask`]| forward          | forward     | no-op                        |
//! | [`CloseAsRunTask`]  | child `close()`  | forward     | no-op                        |
//! | [`WithClosingTask`] | forward          | forward     | child, then run+close extra  |

use async_trait::async_trait;
use tracing::warn;

use crate::error::TaskError;
use crate::tasks::{Task, TaskRef, run_then_close};

/// Ignores `stop()`; the child runs to completion.
pub struct UnstoppableTask {
    inner: TaskRef,
}

impl UnstoppableTask {
    /// Wraps `inner`; `stop()` is never forwarded.
    pub fn new(inner: TaskRef) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Task for UnstoppableTask {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn run(&self) -> Result<(), TaskError> {
        self.inner.run().await
    }

    async fn stop(&self) -> Result<(), TaskError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), TaskError> {
        self.inner.close().await
    }
}

/// Suppresses `close()`; someone else owns the child's resources.
pub struct WithoutCloseTask {
    inner: TaskRef,
}

impl WithoutCloseTask {
    /// Wraps `inner`; `close()` is never forwarded.
    pub fn new(inner: TaskRef) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Task for WithoutCloseTask {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn run(&self) -> Result<(), TaskError> {
        self.inner.run().await
    }

    async fn stop(&self) -> Result<(), TaskError> {
        self.inner.stop().await
    }

    async fn close(&self) -> Result<(), TaskError> {
        Ok(())
    }
}

/// Makes the child's `close()` the main action.
///
/// Placed last in a sequence, this releases a resource as an explicit step
/// of the run instead of waiting for the final close.
pub struct CloseAsRunTask {
    inner: TaskRef,
}

impl CloseAsRunTask {
    /// Wraps `inner`; `run()` closes it.
    pub fn new(inner: TaskRef) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Task for CloseAsRunTask {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn run(&self) -> Result<(), TaskError> {
        self.inner.close().await
    }

    async fn stop(&self) -> Result<(), TaskError> {
        self.inner.stop().await
    }

    async fn close(&self) -> Result<(), TaskError> {
        Ok(())
    }
}

/// Runs an extra cleanup task after the child is closed.
pub struct WithClosingTask {
    inner: TaskRef,
    closing: TaskRef,
}

impl WithClosingTask {
    /// Closes `inner`, then runs and closes `closing`.
    pub fn new(inner: TaskRef, closing: TaskRef) -> Self {
        Self { inner, closing }
    }
}

#[async_trait]
impl Task for WithClosingTask {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn run(&self) -> Result<(), TaskError> {
        self.inner.run().await
    }

    async fn stop(&self) -> Result<(), TaskError> {
        self.inner.stop().await
    }

    async fn close(&self) -> Result<(), TaskError> {
        let first = self.inner.close().await;
        let extra = run_then_close(&self.closing).await;
        match (first, extra) {
            (Err(e), Err(extra_err)) => {
                warn!(task = self.closing.name(), error = %extra_err, "closing action failed");
                Err(e)
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => Ok(()),
        }
    }
}
