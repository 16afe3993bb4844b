//! # Single-child decorators.
//!
//! - [`SwallowTask`] - logs and suppresses failures, pausing after each
//! - [`LoggingTask`] - logs lifecycle transitions
//! - [`RepeatingTask`] - repeats with a fixed pause until stopped
//! - [`UnstoppableTask`], [`WithoutCloseTask`], [`CloseAsRunTask`],
//!   [`WithClosingTask`] - change exactly one operation of the child

mod guards;
mod logging;
mod repeating;
mod swallow;

pub use guards::{CloseAsRunTask, UnstoppableTask, WithClosingTask, WithoutCloseTask};
pub use logging::LoggingTask;
pub use repeating::RepeatingTask;
pub use swallow::SwallowTask;
