//! # Parallel composite.
//!
//! [`ParallelTask`] runs every child on its own worker and waits for all of
//! them.
//!
//! ## Architecture
//! ```text
//! run():
//!   Workers { interrupt } ◄── recorded for stop()
//!   child[0] ──► spawn(interrupt scope { child.run() })
//!   child[1] ──► spawn(...)
//!   ...
//!   join all (failures/panics logged, never returned) ──► Workers::idle()
//!
//! stop():
//!   child.stop() for each child (aggregated per ErrorPolicy)
//!   └─► interrupt.cancel()   (wakes interruptible waits of children that ignore stop)
//!
//! close():
//!   child.close() for each child (aggregated per ErrorPolicy)
//! ```
//!
//! ## Rules
//! - `run()` returns only after every worker has terminated.
//! - Child failures during `run()` are logged, not propagated; only
//!   `stop()`/`close()` report errors.
//! - An interrupt never drops a child's `run()` future. It wakes the
//!   [`interruptible`](crate::interruptible) waits inside the child (pauses,
//!   callback bodies, generator pulls), so nested decorators still finish
//!   their cleanup. Nothing else is preempted.
//! - Workers inherit the caller's `tracing` dispatcher.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{debug, warn};

use crate::composite::aggregate::{ErrorPolicy, Failures};
use crate::error::TaskError;
use crate::tasks::{Task, TaskRef, scope};

/// Interrupt handle for the workers of one `run()` call.
struct Workers {
    interrupt: CancellationToken,
    count: usize,
}

impl Workers {
    fn idle() -> Self {
        Self {
            interrupt: CancellationToken::new(),
            count: 0,
        }
    }
}

/// Outcome of one worker: child name, run result, whether it was interrupted.
type WorkerExit = (String, Result<(), TaskError>, bool);

/// Runs children concurrently.
pub struct ParallelTask {
    children: Vec<TaskRef>,
    policy: ErrorPolicy,
    workers: Mutex<Workers>,
}

impl ParallelTask {
    /// Creates a parallel composite with the default [`ErrorPolicy::LastWins`].
    pub fn new(children: Vec<TaskRef>) -> Self {
        Self {
            children,
            policy: ErrorPolicy::default(),
            workers: Mutex::new(Workers::idle()),
        }
    }

    /// Returns the composite with a different aggregation policy.
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Number of workers spawned by the `run()` in progress (0 when idle).
    pub fn active_workers(&self) -> usize {
        self.workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count
    }

    fn record(&self, workers: Workers) {
        *self.workers.lock().unwrap_or_else(PoisonError::into_inner) = workers;
    }

    fn spawn_workers(&self, interrupt: &CancellationToken) -> JoinSet<WorkerExit> {
        let dispatch = tracing::dispatcher::get_default(|d| d.clone());
        let mut set = JoinSet::new();
        for child in &self.children {
            let child = Arc::clone(child);
            let interrupt = interrupt.clone();
            let worker = async move {
                let name = child.name().to_string();
                let res = scope(interrupt.clone(), child.run()).await;
                (name, res, interrupt.is_cancelled())
            };
            set.spawn(worker.with_subscriber(dispatch.clone()));
        }
        set
    }
}

#[async_trait]
impl Task for ParallelTask {
    fn name(&self) -> &str {
        "parallel"
    }

    async fn run(&self) -> Result<(), TaskError> {
        let interrupt = CancellationToken::new();
        self.record(Workers {
            interrupt: interrupt.clone(),
            count: self.children.len(),
        });
        let mut set = self.spawn_workers(&interrupt);

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((name, Err(e), _)) => {
                    warn!(task = %name, label = e.as_label(), error = %e, "parallel child failed");
                }
                Ok((name, Ok(()), true)) => debug!(task = %name, "parallel child interrupted"),
                Ok((_, Ok(()), false)) => {}
                Err(e) => warn!(error = %e, "parallel worker did not complete"),
            }
        }

        self.record(Workers::idle());
        Ok(())
    }

    async fn stop(&self) -> Result<(), TaskError> {
        let mut failures = Failures::new(self.policy);
        for child in &self.children {
            failures.record(child.name(), child.stop().await);
        }
        self.workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .interrupt
            .cancel();
        failures.finish()
    }

    async fn close(&self) -> Result<(), TaskError> {
        let mut failures = Failures::new(self.policy);
        for child in &self.children {
            failures.record(child.name(), child.close().await);
        }
        failures.finish()
    }
}
