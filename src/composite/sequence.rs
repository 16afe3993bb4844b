//! # Sequential composite.
//!
//! [`SequenceTask`] runs its children strictly in list order.
//!
//! ## Rules
//! - `run()`: the first failing child aborts the sequence; later children are
//!   not run and the failure propagates as-is.
//! - `stop()` / `close()`: every child is visited in order regardless of
//!   earlier failures; what is returned is decided by [`ErrorPolicy`].

use async_trait::async_trait;

use crate::composite::aggregate::{ErrorPolicy, Failures};
use crate::error::TaskError;
use crate::tasks::{Task, TaskRef};

/// Runs children one after another.
pub struct SequenceTask {
    children: Vec<TaskRef>,
    policy: ErrorPolicy,
}

impl SequenceTask {
    /// Creates a sequence with the default [`ErrorPolicy::LastWins`].
    pub fn new(children: Vec<TaskRef>) -> Self {
        Self {
            children,
            policy: ErrorPolicy::default(),
        }
    }

    /// Returns the sequence with a different aggregation policy.
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` when the sequence has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[async_trait]
impl Task for SequenceTask {
    fn name(&self) -> &str {
        "sequence"
    }

    async fn run(&self) -> Result<(), TaskError> {
        for child in &self.children {
            child.run().await?;
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), TaskError> {
        let mut failures = Failures::new(self.policy);
        for child in &self.children {
            failures.record(child.name(), child.stop().await);
        }
        failures.finish()
    }

    async fn close(&self) -> Result<(), TaskError> {
        let mut failures = Failures::new(self.policy);
        for child in &self.children {
            failures.record(child.name(), child.close().await);
        }
        failures.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Journal, Probe};

    #[tokio::test]
    async fn failing_child_halts_the_run_but_close_visits_all() {
        let journal = Journal::default();
        let seq = SequenceTask::new(vec![
            Probe::new("a", &journal).arc(),
            Probe::new("b", &journal).failing_run().arc(),
            Probe::new("c", &journal).arc(),
        ]);

        let err = seq.run().await.unwrap_err();
        assert!(matches!(err, TaskError::Fail { ref error } if error == "b run"));
        assert_eq!(journal.entries(), vec!["a:run", "a:done", "b:run"]);

        seq.close().await.unwrap();
        assert_eq!(
            &journal.entries()[3..],
            &["a:close", "b:close", "c:close"]
        );
    }

    #[tokio::test]
    async fn close_without_run_is_ok() {
        let journal = Journal::default();
        let seq = SequenceTask::new(vec![Probe::new("a", &journal).arc()]);
        assert!(seq.close().await.is_ok());
        assert!(SequenceTask::new(Vec::new()).close().await.is_ok());
    }

    #[tokio::test]
    async fn stop_visits_every_child_and_keeps_the_last_error() {
        let journal = Journal::default();
        let seq = SequenceTask::new(vec![
            Probe::new("a", &journal).failing_stop().arc(),
            Probe::new("b", &journal).arc(),
            Probe::new("c", &journal).failing_stop().arc(),
        ]);

        let err = seq.stop().await.unwrap_err();
        assert!(matches!(err, TaskError::Fail { ref error } if error == "c stop"));
        assert_eq!(journal.entries(), vec!["a:stop", "b:stop", "c:stop"]);
    }

    #[tokio::test]
    async fn collect_policy_reports_every_close_failure() {
        let journal = Journal::default();
        let seq = SequenceTask::new(vec![
            Probe::new("a", &journal).failing_close().arc(),
            Probe::new("b", &journal).failing_close().arc(),
        ])
        .with_policy(ErrorPolicy::Collect);

        match seq.close().await {
            Err(TaskError::Aggregate { errors }) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }
}
