//! # Tasks consumed from a lazily generated sequence.
//!
//! [`GeneratorTask`] pulls sub-tasks from a [`TaskGenerator`] one at a time,
//! running and closing each before asking for the next. The sequence is
//! produced lazily, so a generator may block (e.g. on a queue) until the next
//! unit of work exists.
//!
//! ## Rules
//! - The exit flag is checked before each pull and reset when `run()` exits.
//!   A pull blocked inside an interrupted parallel worker ends the loop.
//! - A sub-task is closed whether its `run()` succeeded or not; a failure
//!   ends the loop and propagates.
//! - `close()` closes the generator itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::factory::run_then_close;
use crate::tasks::interrupt::interruptible;
use crate::tasks::task::{NoopTask, Task, TaskRef};

/// Lazy source of sub-tasks.
#[async_trait]
pub trait TaskGenerator: Send + Sync + 'static {
    /// Produces the next task, or `None` once the sequence is exhausted.
    async fn next(&self) -> Result<Option<TaskRef>, TaskError>;

    /// Releases the generator's resources.
    async fn close(&self) -> Result<(), TaskError> {
        Ok(())
    }
}

/// Runs every task a [`TaskGenerator`] yields, in order.
pub struct GeneratorTask<G> {
    generator: G,
    active: Mutex<TaskRef>,
    exit: AtomicBool,
}

impl<G: TaskGenerator> GeneratorTask<G> {
    /// Creates a task consuming `generator`.
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            active: Mutex::new(NoopTask::arc()),
            exit: AtomicBool::new(false),
        }
    }

    fn install(&self, task: TaskRef) {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = task;
    }

    async fn drain(&self) -> Result<(), TaskError> {
        while !self.exit.load(Ordering::Acquire) {
            let Some(next) = interruptible(self.generator.next()).await else {
                break;
            };
            let Some(task) = next? else {
                break;
            };
            self.install(task.clone());
            let res = run_then_close(&task).await;
            self.install(NoopTask::arc());
            res?;
        }
        Ok(())
    }
}

#[async_trait]
impl<G: TaskGenerator> Task for GeneratorTask<G> {
    fn name(&self) -> &str {
        "generator"
    }

    async fn run(&self) -> Result<(), TaskError> {
        let res = self.drain().await;
        self.exit.store(false, Ordering::Release);
        res
    }

    async fn stop(&self) -> Result<(), TaskError> {
        self.exit.store(true, Ordering::Release);
        let active = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        active.stop().await
    }

    async fn close(&self) -> Result<(), TaskError> {
        self.generator.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::ParallelTask;
    use crate::testing::{Journal, Probe};
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;

    struct Queue {
        journal: Journal,
        items: Mutex<VecDeque<TaskRef>>,
    }

    impl Queue {
        fn of(journal: &Journal, items: Vec<TaskRef>) -> Self {
            Self {
                journal: journal.clone(),
                items: Mutex::new(items.into()),
            }
        }
    }

    #[async_trait]
    impl TaskGenerator for Queue {
        async fn next(&self) -> Result<Option<TaskRef>, TaskError> {
            Ok(self.items.lock().unwrap().pop_front())
        }

        async fn close(&self) -> Result<(), TaskError> {
            self.journal.push("queue:close");
            Ok(())
        }
    }

    #[tokio::test]
    async fn consumes_every_generated_task() {
        let journal = Journal::default();
        let task = GeneratorTask::new(Queue::of(
            &journal,
            vec![
                Probe::new("a", &journal).arc(),
                Probe::new("b", &journal).arc(),
            ],
        ));

        task.run().await.unwrap();
        task.close().await.unwrap();
        assert_eq!(
            journal.entries(),
            vec![
                "a:run", "a:done", "a:close", "b:run", "b:done", "b:close", "queue:close"
            ]
        );
    }

    #[tokio::test]
    async fn failure_stops_consumption() {
        let journal = Journal::default();
        let task = GeneratorTask::new(Queue::of(
            &journal,
            vec![
                Probe::new("bad", &journal).failing_run().arc(),
                Probe::new("next", &journal).arc(),
            ],
        ));

        assert!(task.run().await.is_err());
        assert_eq!(journal.entries(), vec!["bad:run", "bad:close"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_ends_the_loop_after_the_active_task() {
        let journal = Journal::default();
        let task = Arc::new(GeneratorTask::new(Queue::of(
            &journal,
            vec![
                Probe::new("long", &journal).until_stopped().arc(),
                Probe::new("never", &journal).arc(),
            ],
        )));

        let runner = Arc::clone(&task);
        let handle = tokio::spawn(async move { runner.run().await });
        tokio::time::sleep(Duration::from_millis(30)).await;
        task.stop().await.unwrap();
        handle.await.unwrap().unwrap();

        assert_eq!(journal.count("never:run"), 0);
        assert_eq!(journal.count("long:close"), 1);
        // flag was reset, so the remaining item is consumed by the next run
        task.run().await.unwrap();
        assert_eq!(journal.count("never:run"), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn interrupted_parallel_worker_still_closes_the_active_task() {
        let journal = Journal::default();
        let generator: TaskRef = Arc::new(GeneratorTask::new(Queue::of(
            &journal,
            vec![
                Probe::new("deaf", &journal).sleeping(Duration::from_secs(60)).arc(),
                Probe::new("next", &journal).arc(),
            ],
        )));
        let par = Arc::new(ParallelTask::new(vec![Arc::clone(&generator)]));

        let runner = Arc::clone(&par);
        let handle = tokio::spawn(async move { runner.run().await });
        tokio::time::sleep(Duration::from_millis(30)).await;
        par.stop().await.unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("generator was not interrupted")
            .unwrap()
            .unwrap();

        assert_eq!(
            journal.entries(),
            vec!["deaf:run", "deaf:stop", "deaf:interrupted", "deaf:close"]
        );
        // outside the worker the remaining item is consumed normally
        generator.run().await.unwrap();
        assert_eq!(journal.count("next:done"), 1);
    }
}
