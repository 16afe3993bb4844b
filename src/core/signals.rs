//! # OS termination signals as a one-way latch.
//!
//! [`SignalWaiter`] flips from "not received" to "received" when the process
//! gets a termination signal, and wakes everyone suspended in
//! [`SignalWaiter::wait`]. The latch never resets; repeated signals are
//! harmless.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//!
//! **Other platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::info;

/// Process-wide "termination requested" latch.
pub struct SignalWaiter {
    received: watch::Sender<bool>,
    registered: Mutex<Vec<&'static str>>,
}

impl SignalWaiter {
    /// Creates an unset latch with no signal handlers installed.
    pub fn new() -> Self {
        let (received, _) = watch::channel(false);
        Self {
            received,
            registered: Mutex::new(Vec::new()),
        }
    }

    /// Returns `true` once a signal has been received.
    pub fn is_received(&self) -> bool {
        *self.received.borrow()
    }

    /// Flips the latch and wakes all waiters. Idempotent.
    ///
    /// Called by the installed handlers; may also be used to request shutdown
    /// programmatically.
    pub fn notify(&self) {
        self.received.send_replace(true);
    }

    /// Suspends until the latch flips; returns immediately if it already has.
    pub async fn wait(&self) {
        let mut rx = self.received.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|received| *received).await;
    }

    /// Names of the signals handlers were installed for.
    pub fn registered(&self) -> Vec<&'static str> {
        self.registered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn mark_registered(&self, names: &[&'static str]) {
        self.registered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(names);
    }

    /// Installs handlers that flip the latch on every delivery.
    ///
    /// Must be called within a tokio runtime. Listeners live for the rest of
    /// the runtime's life.
    #[cfg(unix)]
    pub(crate) fn register(self: &Arc<Self>) -> io::Result<()> {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;
        self.mark_registered(&["SIGINT", "SIGTERM"]);

        let waiter = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let name = tokio::select! {
                    Some(()) = sigint.recv() => "SIGINT",
                    Some(()) = sigterm.recv() => "SIGTERM",
                    else => break,
                };
                info!(signal = name, "termination signal received");
                waiter.notify();
            }
        });
        Ok(())
    }

    /// Installs handlers that flip the latch on every delivery.
    ///
    /// Must be called within a tokio runtime.
    #[cfg(not(unix))]
    pub(crate) fn register(self: &Arc<Self>) -> io::Result<()> {
        self.mark_registered(&["CTRL_C"]);

        let waiter = Arc::clone(self);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                info!(signal = "CTRL_C", "termination signal received");
                waiter.notify();
            }
        });
        Ok(())
    }
}

impl Default for SignalWaiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn notify_wakes_every_waiter() {
        let waiter = Arc::new(SignalWaiter::new());
        assert!(!waiter.is_received());

        let mut handles = Vec::new();
        for _ in 0..3 {
            let w = Arc::clone(&waiter);
            handles.push(tokio::spawn(async move { w.wait().await }));
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        waiter.notify();

        for h in handles {
            tokio::time::timeout(Duration::from_secs(1), h)
                .await
                .expect("waiter not woken")
                .unwrap();
        }
        assert!(waiter.is_received());
    }

    #[tokio::test]
    async fn latch_is_one_way_and_idempotent() {
        let waiter = SignalWaiter::new();
        waiter.notify();
        waiter.notify();
        assert!(waiter.is_received());
        // already received: returns immediately
        tokio::time::timeout(Duration::from_millis(100), waiter.wait())
            .await
            .expect("wait blocked on a flipped latch");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn register_records_signal_names() {
        let waiter = Arc::new(SignalWaiter::new());
        waiter.register().unwrap();
        assert_eq!(waiter.registered(), vec!["SIGINT", "SIGTERM"]);
        assert!(!waiter.is_received());
    }
}
