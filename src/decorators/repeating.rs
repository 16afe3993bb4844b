//! # Fixed-delay repetition.
//!
//! [`RepeatingTask`] runs its child over and over with a fixed pause in
//! between until `stop()` is requested.
//!
//! ## Loop
//! ```text
//! loop {
//!   ├─► exit flag set / worker interrupted? ─► reset flag, return Ok
//!   ├─► child.run()    ─► Err: reset flag, propagate
//!   └─► sleep(pause)   ─► interrupted: reset flag, return Ok
//! }
//! ```
//!
//! ## Rules
//! - The flag is only inspected at the top of the loop: after `stop()` the
//!   decorator may finish the current iteration plus one pause.
//! - `stop()` also forwards to the child to cut the current iteration short.
//! - The flag is reset on every exit path so the task can be run again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::TaskError;
use crate::tasks::{Task, TaskRef, is_interrupted, pause};

/// Repeats its child with a fixed pause until stopped.
pub struct RepeatingTask {
    inner: TaskRef,
    pause: Duration,
    exit: AtomicBool,
}

impl RepeatingTask {
    /// Repeats `inner`, sleeping `pause` after each iteration.
    pub fn new(inner: TaskRef, pause: Duration) -> Self {
        Self {
            inner,
            pause,
            exit: AtomicBool::new(false),
        }
    }

    async fn repeat(&self) -> Result<(), TaskError> {
        let mut iteration: u64 = 0;
        while !self.exit.load(Ordering::Acquire) && !is_interrupted() {
            iteration += 1;
            self.inner.run().await?;
            if !pause(self.pause).await {
                break;
            }
        }
        debug!(task = self.inner.name(), iteration, "repeat loop exited");
        Ok(())
    }
}

#[async_trait]
impl Task for RepeatingTask {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn run(&self) -> Result<(), TaskError> {
        let res = self.repeat().await;
        self.exit.store(false, Ordering::Release);
        res
    }

    async fn stop(&self) -> Result<(), TaskError> {
        self.exit.store(true, Ordering::Release);
        self.inner.stop().await
    }

    async fn close(&self) -> Result<(), TaskError> {
        self.inner.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Journal, Probe};
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_ends_the_loop_and_allows_a_fresh_run() {
        let journal = Journal::default();
        let task = Arc::new(RepeatingTask::new(
            Probe::new("tick", &journal).arc(),
            Duration::from_millis(10),
        ));

        let runner = Arc::clone(&task);
        let handle = tokio::spawn(async move { runner.run().await });
        tokio::time::sleep(Duration::from_millis(5)).await;
        task.stop().await.unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("loop did not exit within one iteration")
            .unwrap()
            .unwrap();
        let after_first = journal.count("tick:run");
        assert!(after_first >= 1);

        // a second run starts a new loop instead of returning immediately
        let runner = Arc::clone(&task);
        let handle = tokio::spawn(async move { runner.run().await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(journal.count("tick:run") > after_first);
        task.stop().await.unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn child_failure_propagates_and_resets() {
        let journal = Journal::default();
        let task = RepeatingTask::new(
            Probe::new("bad", &journal).failing_run().arc(),
            Duration::from_millis(1),
        );

        task.stop().await.unwrap();
        // flag set before run: the loop exits without running the child
        task.run().await.unwrap();
        assert_eq!(journal.count("bad:run"), 0);

        assert!(task.run().await.is_err());
        assert_eq!(journal.count("bad:run"), 1);
        assert!(task.close().await.is_ok());
    }
}
