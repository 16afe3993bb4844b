//! Test doubles shared by the unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::{Task, TaskRef, interruptible};

/// Ordered log of calls observed by probes.
#[derive(Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == entry).count()
    }
}

/// Task that records every call into a [`Journal`].
///
/// Entries are `"<name>:run"`, `"<name>:done"`, `"<name>:stop"`, `"<name>:close"`.
pub(crate) struct Probe {
    name: String,
    journal: Journal,
    run_for: Duration,
    until_stopped: bool,
    fail_run: bool,
    fail_stop: bool,
    fail_close: bool,
    stopped: Mutex<CancellationToken>,
}

impl Probe {
    pub(crate) fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            journal: journal.clone(),
            run_for: Duration::ZERO,
            until_stopped: false,
            fail_run: false,
            fail_stop: false,
            fail_close: false,
            stopped: Mutex::new(CancellationToken::new()),
        }
    }

    /// Sleeps for `d` inside `run()`; the sleep ignores `stop()` but not a
    /// worker interrupt (recorded as `"<name>:interrupted"`).
    pub(crate) fn sleeping(mut self, d: Duration) -> Self {
        self.run_for = d;
        self
    }

    /// Blocks inside `run()` until `stop()` is called.
    pub(crate) fn until_stopped(mut self) -> Self {
        self.until_stopped = true;
        self
    }

    pub(crate) fn failing_run(mut self) -> Self {
        self.fail_run = true;
        self
    }

    pub(crate) fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub(crate) fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub(crate) fn arc(self) -> TaskRef {
        Arc::new(self)
    }
}

#[async_trait]
impl Task for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<(), TaskError> {
        self.journal.push(format!("{}:run", self.name));
        if self.fail_run {
            return Err(TaskError::fail(format!("{} run", self.name)));
        }
        if !self.run_for.is_zero() {
            let slept = interruptible(tokio::time::sleep(self.run_for)).await;
            if slept.is_none() {
                self.journal.push(format!("{}:interrupted", self.name));
                return Ok(());
            }
        }
        if self.until_stopped {
            let token = self.stopped.lock().unwrap().clone();
            token.cancelled().await;
            *self.stopped.lock().unwrap() = CancellationToken::new();
        }
        self.journal.push(format!("{}:done", self.name));
        Ok(())
    }

    async fn stop(&self) -> Result<(), TaskError> {
        self.journal.push(format!("{}:stop", self.name));
        self.stopped.lock().unwrap().cancel();
        if self.fail_stop {
            return Err(TaskError::fail(format!("{} stop", self.name)));
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), TaskError> {
        self.journal.push(format!("{}:close", self.name));
        if self.fail_close {
            return Err(TaskError::fail(format!("{} close", self.name)));
        }
        Ok(())
    }
}

/// In-memory log sink for asserting on emitted lines.
#[derive(Clone, Default)]
pub(crate) struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    pub(crate) fn dispatch(&self) -> tracing::Dispatch {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::Dispatch::new(subscriber)
    }

    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
