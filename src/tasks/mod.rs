//! # Task contract and leaf tasks.
//!
//! This module provides the core task-related types:
//! - [`Task`] - trait every component implements (`run`, `stop`, `close`)
//! - [`TaskRef`] - shared handle to a task (`Arc<dyn Task>`)
//! - [`NoopTask`] - placeholder that does nothing
//! - [`FnTask`] - closure-backed task
//! - [`DelegatingTask`] - forwards to a swappable current task
//! - [`FactoryTask`] - runs a factory-built task per run and closes it
//! - [`GeneratorTask`] - consumes a lazily generated sequence of tasks
//! - [`ProvidedTask`] - runs a task within a [`Provider`]'s scope
//! - [`interruptible`] - awaits that give up when a parallel worker is interrupted

mod delegating;
mod factory;
mod generator;
mod interrupt;
mod provided;
mod task;
mod task_fn;

pub(crate) use factory::run_then_close;
pub(crate) use interrupt::{pause, scope};

pub use delegating::DelegatingTask;
pub use factory::{FactoryTask, TaskFactory};
pub use generator::{GeneratorTask, TaskGenerator};
pub use interrupt::{interruptible, is_interrupted};
pub use provided::{ProvidedTask, Provider, Scope};
pub use task::{NoopTask, Task, TaskRef};
pub use task_fn::FnTask;
