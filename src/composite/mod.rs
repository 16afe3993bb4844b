//! # Multi-child composites.
//!
//! - [`SequenceTask`] - children run strictly in order
//! - [`ParallelTask`] - one worker per child, joined before `run()` returns
//! - [`ErrorPolicy`] - how several `stop()`/`close()` failures are reported

mod aggregate;
mod parallel;
mod sequence;

pub use aggregate::ErrorPolicy;
pub use parallel::ParallelTask;
pub use sequence::SequenceTask;
