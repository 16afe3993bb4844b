//! # Daemon Example
//!
//! Runs a small task tree as a daemon until Ctrl-C / SIGTERM:
//! - a heartbeat repeated every second, with failures contained;
//! - a job queue drained by a generator;
//! - a cleanup step after close.
//!
//! ```text
//! cargo run --example daemon -- /tmp/taskframe-demo.pid
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use taskframe::{
    Daemon, DaemonConfig, DaemonLog, GeneratorTask, Lifecycle, ProcessContext, TaskError,
    TaskGenerator, TaskRef,
};

/// Hands out a fixed batch of jobs, one at a time.
struct Jobs {
    pending: Mutex<VecDeque<u32>>,
}

#[async_trait]
impl TaskGenerator for Jobs {
    async fn next(&self) -> Result<Option<TaskRef>, TaskError> {
        let Some(id) = self.pending.lock().unwrap_or_else(PoisonError::into_inner).pop_front() else {
            return Ok(None);
        };
        let job = Lifecycle::from_fn(format!("job-{id}"), move |_ctx| async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            tracing::info!(job = id, "job processed");
            Ok(())
        });
        Ok(Some(job.into_ref()))
    }
}

async fn heartbeat(ctx: CancellationToken) -> Result<(), TaskError> {
    if ctx.is_cancelled() {
        return Ok(());
    }
    if rand::random::<f32>() < 0.15 {
        return Err(TaskError::fail("heartbeat missed"));
    }
    tracing::info!("heartbeat");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let pid_file = std::env::args().nth(1);

    let heartbeat = Lifecycle::from_fn("heartbeat", heartbeat)
        .repeat(Duration::from_secs(1))
        .swallow("heartbeat", Duration::from_secs(2))
        .logged("heartbeat");

    let jobs = Lifecycle::new(GeneratorTask::new(Jobs {
        pending: Mutex::new((1..=5).collect()),
    }))
    .logged("jobs");

    let cleanup = Lifecycle::from_fn("cleanup", |_ctx| async {
        tracing::info!("cleanup done");
        Ok(())
    });

    let root = Lifecycle::parallel([heartbeat, jobs]).with_closing(cleanup);

    let mut cfg = DaemonConfig::default()
        .with_close_std_streams(false)
        .with_shutdown_grace(Duration::from_secs(5));
    if let Some(path) = pid_file {
        cfg = cfg.with_pid_file(path);
    }

    let ctx = ProcessContext::new();
    Daemon::new(root, DaemonLog::stderr(), cfg).run(&ctx).await?;
    Ok(())
}
