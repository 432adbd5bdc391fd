//! Process-wide shutdown signal shared by the HTTP server and the scheduler.

use tokio::sync::watch;

/// Fires the shutdown signal. Dropping the trigger also counts as shutdown.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

/// Cloneable handle observing the shutdown signal.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

/// Creates a connected trigger / observer pair.
pub fn shutdown_channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

impl Shutdown {
    /// Returns true once shutdown has been requested.
    pub fn is_cancelled(&self) -> bool {
        let requested = *self.rx.borrow();
        requested || self.rx.has_changed().is_err()
    }

    /// Completes when shutdown is requested (immediately if it already was).
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            // Err means the trigger is gone, which is treated as shutdown.
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancelled_resolves_after_trigger() {
        let (trigger, shutdown) = shutdown_channel();
        let mut waiter = shutdown.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        assert!(!shutdown.is_cancelled());
        trigger.trigger();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(shutdown.is_cancelled());
    }

    #[tokio::test]
    async fn test_clone_after_trigger_is_cancelled() {
        let (trigger, shutdown) = shutdown_channel();
        trigger.trigger();

        let mut late = shutdown.clone();
        assert!(late.is_cancelled());
        tokio::time::timeout(Duration::from_millis(100), late.cancelled())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dropped_trigger_counts_as_shutdown() {
        let (trigger, mut shutdown) = shutdown_channel();
        drop(trigger);

        assert!(shutdown.is_cancelled());
        tokio::time::timeout(Duration::from_millis(100), shutdown.cancelled())
            .await
            .unwrap();
    }
}
