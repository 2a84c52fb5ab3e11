// src/mirror/shutdown.rs
// =============================================================================
// Cooperative cancellation for a running crawl.
//
// Once requested, walkers stop submitting new tasks and tasks still waiting
// for a worker slot give up. Downloads already in progress are left to
// finish so no half-written file is abandoned mid-stream.
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Coordinates cancellation across crawl tasks.
#[derive(Debug, Default)]
pub struct Shutdown {
    requested: AtomicBool,
    notify: Notify,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new shared signal wrapped in [`Arc`].
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Request shutdown. Wakes every waiter exactly once.
    pub fn request(&self) {
        if !self.requested.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Resolves once shutdown has been requested. Returns immediately if it
    /// already was.
    pub async fn wait(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a request between the two
        // cannot be missed
        notified.as_mut().enable();

        if self.is_requested() {
            return;
        }
        notified.await;
    }
}
