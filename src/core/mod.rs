//! Process-level runtime: the daemon controller and what it manages.
//!
//! The public API from this module is [`Daemon`], [`ProcessContext`],
//! [`SignalWaiter`], [`DaemonLog`] and [`PidFile`].
//!
//! Internal modules:
//! - [`daemon`]: startup sequence and root-task supervision;
//! - [`context`]: explicit process-wide state (start-once flag, latch, PID files);
//! - [`signals`]: SIGINT/SIGTERM latch;
//! - [`pid_file`]: PID-file guard;
//! - [`log`]: log sink installed for the run;
//! - [`stdio`]: detaching standard streams.

mod context;
mod daemon;
mod log;
mod pid_file;
mod signals;
mod stdio;

pub use context::ProcessContext;
pub use daemon::{Daemon, DaemonState};
pub use log::DaemonLog;
pub use pid_file::PidFile;
pub use signals::SignalWaiter;
