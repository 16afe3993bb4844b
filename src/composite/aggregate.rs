//! # Failure aggregation for `stop()` / `close()` passes.
//!
//! Composites visit every child during `stop()` and `close()` even when an
//! earlier child failed. [`ErrorPolicy`] decides what survives the pass:
//!
//! - [`ErrorPolicy::LastWins`] (default) returns the most recently captured
//!   error; earlier ones are logged at `debug` and dropped.
//! - [`ErrorPolicy::Collect`] returns every captured error as
//!   [`TaskError::Aggregate`] (or the error itself when only one occurred).

use tracing::debug;

use crate::error::TaskError;

/// How composites report several child failures from one pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Keep only the last captured error.
    #[default]
    LastWins,
    /// Keep all captured errors in visit order.
    Collect,
}

/// Accumulates the outcome of one visit-every-child pass.
pub(crate) struct Failures {
    policy: ErrorPolicy,
    errors: Vec<TaskError>,
}

impl Failures {
    pub(crate) fn new(policy: ErrorPolicy) -> Self {
        Self {
            policy,
            errors: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, child: &str, res: Result<(), TaskError>) {
        let Err(e) = res else {
            return;
        };
        if self.policy == ErrorPolicy::LastWins {
            if let Some(prev) = self.errors.pop() {
                debug!(error = %prev, "discarding earlier child failure");
            }
        }
        debug!(task = child, error = %e, "child failed");
        self.errors.push(e);
    }

    pub(crate) fn finish(mut self) -> Result<(), TaskError> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(TaskError::Aggregate {
                errors: self.errors,
            }),
        }
    }
}
