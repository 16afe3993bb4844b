//! # Log sink for the daemon.
//!
//! [`DaemonLog`] carries the `tracing` dispatcher the daemon installs for the
//! duration of its run, and whether that sink writes to stdout/stderr (in
//! which case those streams must stay open).
//!
//! Any subscriber works; [`DaemonLog::stderr`] and [`DaemonLog::file`] cover
//! the common cases with `tracing_subscriber::fmt`. The filter comes from
//! `RUST_LOG` and defaults to `info`.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

/// Log destination installed by [`Daemon`](crate::Daemon).
#[derive(Clone)]
pub struct DaemonLog {
    dispatch: Dispatch,
    uses_std_streams: bool,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

impl DaemonLog {
    /// Wraps an arbitrary dispatcher.
    ///
    /// Set `uses_std_streams` when the subscriber writes to stdout or stderr.
    pub fn new(dispatch: impl Into<Dispatch>, uses_std_streams: bool) -> Self {
        Self {
            dispatch: dispatch.into(),
            uses_std_streams,
        }
    }

    /// Human-readable lines on stderr.
    pub fn stderr() -> Self {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(io::stderr)
            .finish();
        Self::new(subscriber, true)
    }

    /// Lines appended to the file at `path` (created if missing).
    pub fn file(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .finish();
        Ok(Self::new(subscriber, false))
    }

    /// Discards everything.
    pub fn disabled() -> Self {
        Self::new(Dispatch::none(), false)
    }

    /// Dispatcher to install.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Whether stdout/stderr must stay open for this sink.
    pub fn uses_std_streams(&self) -> bool {
        self.uses_std_streams
    }
}
