//! # Daemon configuration.
//!
//! Provides [`DaemonConfig`], the settings consumed by [`Daemon`](crate::Daemon).
//!
//! ## Sentinel values
//! - `pid_file = None` → no PID-file bookkeeping
//! - `shutdown_grace = 0s` → no grace warning after a shutdown signal

use std::path::PathBuf;
use std::time::Duration;

/// Process-level settings for the daemon controller.
///
/// ## Field semantics
/// - `pid_file`: where to record the process id (`None` = skip)
/// - `close_std_streams`: redirect stdin (and stdout/stderr when logging does
///   not use them) to `/dev/null` on first start
/// - `handle_signals`: install SIGINT/SIGTERM handlers on first start
/// - `shutdown_grace`: after a signal, how long the root task may keep running
///   before a warning is logged (`0s` = never warn)
///
/// ## Example
/// ```
/// use std::time::Duration;
/// use taskframe::DaemonConfig;
///
/// let cfg = DaemonConfig::default()
///     .with_pid_file("/run/worker.pid")
///     .with_shutdown_grace(Duration::from_secs(5));
/// assert!(cfg.pid_file.is_some());
/// assert_eq!(cfg.grace(), Some(Duration::from_secs(5)));
/// ```
#[derive(Clone, Debug)]
pub struct DaemonConfig {
    /// Path of the PID file, if any.
    pub pid_file: Option<PathBuf>,

    /// Detach the process from its standard streams on first start.
    pub close_std_streams: bool,

    /// Register OS termination signal handlers on first start.
    pub handle_signals: bool,

    /// Grace window after a shutdown signal before a warning is logged.
    pub shutdown_grace: Duration,
}

impl DaemonConfig {
    /// Returns a config with the PID file set.
    pub fn with_pid_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.pid_file = Some(path.into());
        self
    }

    /// Returns a config with stream detaching switched on or off.
    pub fn with_close_std_streams(mut self, close: bool) -> Self {
        self.close_std_streams = close;
        self
    }

    /// Returns a config with signal handling switched on or off.
    pub fn with_signals(mut self, handle: bool) -> Self {
        self.handle_signals = handle;
        self
    }

    /// Returns a config with an updated shutdown grace.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Returns the shutdown grace as an `Option`.
    ///
    /// - `None` → never warn
    /// - `Some(d)` → warn when the root task outlives `d` after a signal
    #[inline]
    pub fn grace(&self) -> Option<Duration> {
        if self.shutdown_grace == Duration::ZERO {
            None
        } else {
            Some(self.shutdown_grace)
        }
    }
}

impl Default for DaemonConfig {
    /// Default configuration:
    ///
    /// - `pid_file = None`
    /// - `close_std_streams = true`
    /// - `handle_signals = true`
    /// - `shutdown_grace = 30s`
    fn default() -> Self {
        Self {
            pid_file: None,
            close_std_streams: true,
            handle_signals: true,
            shutdown_grace: Duration::from_secs(30),
        }
    }
}
