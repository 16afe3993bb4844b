//! # Process-wide daemon state.
//!
//! [`ProcessContext`] is created once at process entry and handed to every
//! [`Daemon::run`](crate::Daemon::run). It replaces hidden globals with an
//! explicit value holding:
//! - the one-way `started` flag guarding stream detaching and signal
//!   registration (one mutex, so duplicate/concurrent runs stay idempotent);
//! - the shared [`SignalWaiter`];
//! - the PID files recorded so far, removed when the context is dropped at
//!   the end of `main`.

use std::sync::{Arc, Mutex, PoisonError};

use crate::core::pid_file::PidFile;
use crate::core::signals::SignalWaiter;
use crate::error::DaemonError;

/// Explicit process-level context for daemon runs.
pub struct ProcessContext {
    started: Mutex<bool>,
    signals: Arc<SignalWaiter>,
    pid_files: Mutex<Vec<PidFile>>,
}

impl ProcessContext {
    /// Creates a context with no setup done, an unset latch and no PID files.
    pub fn new() -> Self {
        Self {
            started: Mutex::new(false),
            signals: Arc::new(SignalWaiter::new()),
            pid_files: Mutex::new(Vec::new()),
        }
    }

    /// The shared termination latch.
    pub fn signals(&self) -> &Arc<SignalWaiter> {
        &self.signals
    }

    /// Returns `true` once the one-time setup has completed.
    pub fn is_started(&self) -> bool {
        *self.started.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `setup` under the context mutex unless it already succeeded once.
    ///
    /// Returns `Ok(true)` when `setup` ran now. A failed `setup` leaves the
    /// flag unset.
    pub(crate) fn start_once<F>(&self, setup: F) -> Result<bool, DaemonError>
    where
        F: FnOnce() -> Result<(), DaemonError>,
    {
        let mut started = self.started.lock().unwrap_or_else(PoisonError::into_inner);
        if *started {
            return Ok(false);
        }
        setup()?;
        *started = true;
        Ok(true)
    }

    /// Keeps `pid_file` alive until the context is dropped.
    pub(crate) fn keep_pid_file(&self, pid_file: PidFile) {
        self.pid_files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(pid_file);
    }

    /// Removes every PID file recorded so far.
    pub fn release_pid_files(&self) {
        self.pid_files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for ProcessContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_runs_once() {
        let ctx = ProcessContext::new();
        let mut calls = 0;
        assert!(ctx.start_once(|| {
            calls += 1;
            Ok(())
        })
        .unwrap());
        assert!(!ctx.start_once(|| panic!("second setup")).unwrap());
        assert_eq!(calls, 1);
        assert!(ctx.is_started());
    }

    #[test]
    fn failed_setup_can_be_retried() {
        let ctx = ProcessContext::new();
        let err = ctx
            .start_once(|| Err(DaemonError::Stdio(std::io::Error::other("nope"))))
            .unwrap_err();
        assert_eq!(err.as_label(), "daemon_stdio");
        assert!(!ctx.is_started());
        assert!(ctx.start_once(|| Ok(())).unwrap());
    }

    #[test]
    fn dropping_the_context_removes_pid_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.pid");

        let ctx = ProcessContext::new();
        ctx.keep_pid_file(PidFile::create(&path).unwrap());
        assert!(path.exists());
        drop(ctx);
        assert!(!path.exists());
    }
}
