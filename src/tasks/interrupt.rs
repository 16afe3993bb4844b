//! # Worker interruption.
//!
//! [`ParallelTask`](crate::ParallelTask) scopes every worker with the
//! interrupt token of its current `run()`. Blocking points that observe it
//! (pauses of [`RepeatingTask`](crate::RepeatingTask) and
//! [`SwallowTask`](crate::SwallowTask), [`FnTask`](crate::FnTask) bodies,
//! [`GeneratorTask`](crate::GeneratorTask) pulls, and anything user code wraps
//! in [`interruptible`]) give up once the token fires, and the surrounding
//! decorators unwind through their normal code paths.
//!
//! Wrappers never drop a child's `run()` future: cleanup after the await
//! (closing a work task, resetting a loop flag) always runs. Code that awaits
//! something outside [`interruptible`] and ignores `stop()` is not preempted.

use std::future::Future;

use tokio_util::sync::CancellationToken;

tokio::task_local! {
    static INTERRUPT: CancellationToken;
}

/// Runs `fut` with `token` as the interrupt of the current worker.
pub(crate) fn scope<F: Future>(
    token: CancellationToken,
    fut: F,
) -> impl Future<Output = F::Output> {
    INTERRUPT.scope(token, fut)
}

/// Returns `true` when the enclosing worker has been interrupted.
pub fn is_interrupted() -> bool {
    INTERRUPT
        .try_with(CancellationToken::is_cancelled)
        .unwrap_or(false)
}

/// Awaits `fut` unless the enclosing worker is interrupted first.
///
/// Returns `None` when interrupted (`fut` is dropped). Outside a
/// [`ParallelTask`](crate::ParallelTask) worker this is plain `fut.await`.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use taskframe::interruptible;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let slept = interruptible(tokio::time::sleep(Duration::from_millis(1))).await;
/// assert!(slept.is_some());
/// # }
/// ```
pub async fn interruptible<F: Future>(fut: F) -> Option<F::Output> {
    let Ok(token) = INTERRUPT.try_with(CancellationToken::clone) else {
        return Some(fut.await);
    };
    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        out = fut => Some(out),
    }
}

/// Sleeps for `pause` unless interrupted; returns `false` when interrupted.
pub(crate) async fn pause(pause: std::time::Duration) -> bool {
    interruptible(tokio::time::sleep(pause)).await.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn outside_a_worker_nothing_interrupts() {
        assert!(!is_interrupted());
        assert_eq!(interruptible(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn fired_token_cuts_the_wait_short() {
        let token = CancellationToken::new();
        token.cancel();
        let out = scope(token, async {
            let slept = interruptible(tokio::time::sleep(Duration::from_secs(60))).await;
            (slept.is_none(), is_interrupted())
        })
        .await;
        assert_eq!(out, (true, true));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancel_wakes_a_pending_pause() {
        let token = CancellationToken::new();
        let handle = tokio::spawn(scope(token.clone(), pause(Duration::from_secs(60))));
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
        let completed = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("pause ignored the interrupt")
            .unwrap();
        assert!(!completed);
    }
}
