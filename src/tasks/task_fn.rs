//! # Function-backed task (`FnTask`)
//!
//! [`FnTask`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing a
//! fresh future per `run()`. The token handed to the closure is cancelled by
//! `stop()`, so long-running callbacks can exit cooperatively.
//!
//! ## Concurrency semantics
//! - Each `run()` creates a **new** future and a **new** token.
//! - `stop()` cancels the token of the run in progress; with no run in
//!   progress it is a no-op.
//! - `close()` is a no-op; callbacks own no resources the task could release.
//! - Inside an interrupted parallel worker the callback's future is dropped
//!   and `run()` returns `Ok(())`.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use taskframe::{FnTask, TaskRef, TaskError};
//!
//! let t: TaskRef = FnTask::arc("worker", |ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Ok(());
//!     }
//!     // do work...
//!     Ok::<_, TaskError>(())
//! });
//!
//! assert_eq!(t.name(), "worker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::interrupt::interruptible;
use crate::tasks::task::Task;

/// Function-backed task implementation.
///
/// Wraps a closure that *creates* a new future per run.
pub struct FnTask<F> {
    name: Cow<'static, str>,
    f: F,
    current: Mutex<CancellationToken>,
}

impl<F, Fut> FnTask<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    /// Creates a new function-backed task.
    ///
    /// Prefer [`FnTask::arc`] when you immediately need a [`TaskRef`](crate::TaskRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
            current: Mutex::new(CancellationToken::new()),
        }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Task for FnTask<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<(), TaskError> {
        let token = CancellationToken::new();
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = token.clone();
        interruptible((self.f)(token)).await.unwrap_or(Ok(()))
    }

    async fn stop(&self) -> Result<(), TaskError> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
        Ok(())
    }

    async fn close(&self) -> Result<(), TaskError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn each_run_calls_the_closure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let t = FnTask::arc("count", move |_ctx| {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        t.run().await.unwrap();
        t.run().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn close_without_run_is_ok() {
        let t = FnTask::arc("idle", |_ctx| async { Ok(()) });
        assert!(t.close().await.is_ok());
        assert!(t.stop().await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_cancels_the_running_callback() {
        let t = FnTask::arc("wait", |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Ok(())
        });

        let runner = Arc::clone(&t);
        let handle = tokio::spawn(async move { runner.run().await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        t.stop().await.unwrap();

        let res = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("run did not observe stop");
        assert!(res.unwrap().is_ok());
    }
}
