//! Error types used by tasks and the daemon controller.
//!
//! This module defines two main error enums:
//!
//! - [`TaskError`] - errors raised by `run`/`stop`/`close` of individual tasks.
//! - [`DaemonError`] - errors raised by the process-level [`Daemon`](crate::Daemon).
//!
//! Both types provide `as_label` for logging, [`TaskError`] additionally
//! offers `as_message` and the [`TaskError::fail`] shorthand.

use std::fmt::Display;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// # Errors produced by task operations.
///
/// Cooperative cancellation is not an error: a `run()` that returns early
/// because `stop()` was observed returns `Ok(())`. [`TaskError::Canceled`]
/// exists for leaves that prefer to report the early exit explicitly.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Operation failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Non-recoverable error.
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// Operation gave up because cancellation was requested.
    #[error("cancelled")]
    Canceled,

    /// Task body panicked; the panic was contained.
    #[error("task panicked: {error}")]
    Panicked {
        /// Panic payload rendered as text (if it was a string).
        error: String,
    },

    /// Several children failed during one `stop`/`close` pass.
    ///
    /// Only produced under [`ErrorPolicy::Collect`](crate::ErrorPolicy::Collect).
    #[error("{} child operations failed", errors.len())]
    Aggregate {
        /// Captured errors in visit order.
        errors: Vec<TaskError>,
    },
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`] from anything displayable.
    ///
    /// # Example
    /// ```
    /// use taskframe::TaskError;
    ///
    /// let err = TaskError::fail("disk full");
    /// assert_eq!(err.to_string(), "execution failed: disk full");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskframe::TaskError;
    ///
    /// assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Canceled => "task_canceled",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Aggregate { .. } => "task_aggregate",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Fatal { error } => format!("fatal: {error}"),
            TaskError::Canceled => "cancelled".to_string(),
            TaskError::Panicked { error } => format!("panic: {error}"),
            TaskError::Aggregate { errors } => {
                let parts: Vec<String> = errors.iter().map(TaskError::as_message).collect();
                format!("aggregate: [{}]", parts.join("; "))
            }
        }
    }

    /// Builds a [`TaskError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let error = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        TaskError::Panicked { error }
    }
}

/// # Errors produced by the daemon controller.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DaemonError {
    /// A PID file already exists; another instance may be running.
    #[error("pid file {path:?} already exists; is another instance running?")]
    PidFileExists {
        /// Path of the offending file.
        path: PathBuf,
    },

    /// The PID file could not be written.
    #[error("failed to write pid file {path:?}: {source}")]
    PidFile {
        /// Path that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Redirecting the standard streams failed.
    #[error("failed to detach standard streams: {0}")]
    Stdio(#[source] io::Error),

    /// Registering OS signal handlers failed.
    #[error("failed to register signal handlers: {0}")]
    Signals(#[source] io::Error),

    /// The root task failed.
    #[error(transparent)]
    Task(#[from] TaskError),
}

impl DaemonError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DaemonError::PidFileExists { .. } => "daemon_pid_file_exists",
            DaemonError::PidFile { .. } => "daemon_pid_file",
            DaemonError::Stdio(_) => "daemon_stdio",
            DaemonError::Signals(_) => "daemon_signals",
            DaemonError::Task(_) => "daemon_task",
        }
    }
}
