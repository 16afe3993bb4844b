//! # Task contract.
//!
//! This module defines the [`Task`] trait: three async operations (`run`,
//! `stop`, `close`) every component of the framework implements. The common
//! handle type is [`TaskRef`], an `Arc<dyn Task>` that can be moved into
//! spawned workers while another caller holds it to issue `stop()`.
//!
//! ## Rules
//! - `stop()` may be called from any thread, before, during or after `run()`.
//!   It must not block indefinitely and must not fail merely because nothing
//!   is running.
//! - `close()` must work without a prior `run()` and must not assume that
//!   `run()` succeeded.
//! - A wrapper exclusively owns its children; the composition graph is a tree.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;

/// Shared handle to a task.
pub type TaskRef = Arc<dyn Task>;

/// # Unit of work with a run/stop/close lifecycle.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use async_trait::async_trait;
/// use taskframe::{Task, TaskError};
///
/// #[derive(Default)]
/// struct Poller {
///     exit: AtomicBool,
/// }
///
/// #[async_trait]
/// impl Task for Poller {
///     async fn run(&self) -> Result<(), TaskError> {
///         while !self.exit.load(Ordering::Acquire) {
///             tokio::time::sleep(std::time::Duration::from_millis(10)).await;
///         }
///         Ok(())
///     }
///
///     async fn stop(&self) -> Result<(), TaskError> {
///         self.exit.store(true, Ordering::Release);
///         Ok(())
///     }
///
///     async fn close(&self) -> Result<(), TaskError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Human-readable name used in log lines.
    fn name(&self) -> &str {
        "task"
    }

    /// Performs the work; returns when done or once a stop request is observed.
    async fn run(&self) -> Result<(), TaskError>;

    /// Requests cooperative cancellation of an in-progress `run()`.
    async fn stop(&self) -> Result<(), TaskError>;

    /// Releases held resources.
    async fn close(&self) -> Result<(), TaskError>;
}

/// Task that does nothing; used as a placeholder.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTask;

impl NoopTask {
    /// Returns a shared placeholder handle.
    pub fn arc() -> TaskRef {
        Arc::new(NoopTask)
    }
}

#[async_trait]
impl Task for NoopTask {
    fn name(&self) -> &str {
        "noop"
    }

    async fn run(&self) -> Result<(), TaskError> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), TaskError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), TaskError> {
        Ok(())
    }
}
