//! # taskframe
//!
//! **taskframe** is a small framework for composable task lifecycles.
//!
//! Every component is a [`Task`] with three async operations: `run`, `stop`
//! and `close`. Tasks nest: decorators wrap one child, composites wrap many,
//! and a [`Daemon`] drives the root of the tree as the life of the process
//! (PID file, log sink, detached streams, signal-based graceful shutdown).
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                     ┌───────────────────────────────┐
//!                     │ Daemon (root task controller) │
//!                     │  - PidFile (single instance)  │
//!                     │  - DaemonLog (scoped sink)    │
//!                     │  - ProcessContext (start once)│
//!                     └──────┬─────────────────▲──────┘
//!                run/close   │                 │ SIGINT/SIGTERM
//!                            ▼                 │ ─► SignalWaiter ─► stop()
//!              ┌──────────────────────────┐
//!              │ LoggingTask / SwallowTask│   decorators (one child)
//!              └────────────┬─────────────┘
//!                           ▼
//!              ┌──────────────────────────┐
//!              │ ParallelTask             │   composites (many children)
//!              └──┬─────────────────────┬─┘
//!                 ▼                     ▼
//!        ┌────────────────┐    ┌─────────────────┐
//!        │ RepeatingTask  │    │ SequenceTask    │
//!        └───────┬────────┘    └──┬───────────┬──┘
//!                ▼                ▼           ▼
//!            FnTask          FactoryTask  ProvidedTask   leaves
//! ```
//!
//! ### Lifecycle
//! ```text
//! run()   ─► do the work; return on completion or at the next checkpoint after stop()
//! stop()  ─► request cooperative cancellation (any thread, any time, never blocks for long)
//! close() ─► release resources (valid without run(), after a failed run(), twice)
//! ```
//!
//! ## Features
//! | Area            | Description                                              | Key types                                      |
//! |-----------------|----------------------------------------------------------|------------------------------------------------|
//! | **Contract**    | Three-operation task trait and leaves.                    | [`Task`], [`TaskRef`], [`FnTask`], [`NoopTask`] |
//! | **Decorators**  | Repeat, log, contain failures, reshape stop/close.        | [`RepeatingTask`], [`SwallowTask`], [`LoggingTask`] |
//! | **Composites**  | Ordered or concurrent children with failure aggregation. | [`SequenceTask`], [`ParallelTask`], [`ErrorPolicy`] |
//! | **Interrupts**  | Waits that give up when a parallel worker is stopped.    | [`interruptible`], [`is_interrupted`]          |
//! | **Sources**     | Factory-, generator- and provider-backed tasks.           | [`FactoryTask`], [`GeneratorTask`], [`ProvidedTask`] |
//! | **Facade**      | Fluent construction, background start/stop/join.          | [`Lifecycle`], [`Started`]                     |
//! | **Daemon**      | PID file, log sink, stream detaching, signals.            | [`Daemon`], [`ProcessContext`], [`SignalWaiter`] |
//! | **Errors**      | Typed errors with stable labels.                          | [`TaskError`], [`DaemonError`]                 |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskframe::{Lifecycle, TaskError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), TaskError> {
//!     let heartbeat = Lifecycle::from_fn("heartbeat", |_ctx| async {
//!         println!("tick");
//!         Ok(())
//!     })
//!     .repeat(Duration::from_millis(50))
//!     .swallow("heartbeat", Duration::from_millis(500));
//!
//!     let running = heartbeat.start();
//!     tokio::time::sleep(Duration::from_millis(120)).await;
//!     running.stop_and_join().await
//! }
//! ```

mod composite;
mod config;
mod core;
mod decorators;
mod error;
mod lifecycle;
mod tasks;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use composite::{ErrorPolicy, ParallelTask, SequenceTask};
pub use config::DaemonConfig;
pub use crate::core::{Daemon, DaemonLog, DaemonState, PidFile, ProcessContext, SignalWaiter};
pub use decorators::{
    CloseAsRunTask, LoggingTask, RepeatingTask, SwallowTask, UnstoppableTask, WithClosingTask,
    WithoutCloseTask,
};
pub use error::{DaemonError, TaskError};
pub use lifecycle::{Lifecycle, Started};
pub use tasks::{
    DelegatingTask, FactoryTask, FnTask, GeneratorTask, NoopTask, ProvidedTask, Provider, Scope,
    Task, TaskFactory, TaskGenerator, TaskRef, interruptible, is_interrupted,
};
