//! Shutdown coordination for the proxy.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

/// Coordinator for process shutdown.
///
/// Provides a broadcast channel that all long-running tasks can subscribe to,
/// plus a fatal flag so supervised background tasks can request a non-zero
/// exit instead of aborting the process themselves.
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
    /// Set when shutdown was triggered by an unrecoverable fault.
    fatal: AtomicBool,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            fatal: AtomicBool::new(false),
        }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger an orderly shutdown.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Trigger shutdown for an unrecoverable fault.
    ///
    /// The main loop observes the flag once the server has drained and turns
    /// it into a non-zero process exit.
    pub fn trigger_fatal(&self) {
        self.fatal.store(true, Ordering::SeqCst);
        let _ = self.tx.send(());
    }

    /// Whether shutdown was caused by an unrecoverable fault.
    pub fn is_fatal(&self) -> bool {
        self.fatal.load(Ordering::SeqCst)
    }

    /// Get the number of active subscribers (tasks still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
