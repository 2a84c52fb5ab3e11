// src/mirror/pool.rs
// =============================================================================
// The worker budget shared by the whole crawl.
//
// A WorkerPool is a counting semaphore: each network operation (one listing
// fetch or one file download) must hold a WorkerSlot while it runs.
//
// Directory tasks do NOT hold a slot while they wait for their children.
// That is what keeps recursion from deadlocking: with a pool of 1, the root
// fetches its listing, gives the slot back, and then waits on a JoinSet
// while its children take turns with the slot.
// =============================================================================

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Permission to perform one network operation. Released on drop.
#[derive(Debug)]
pub struct WorkerSlot {
    _permit: OwnedSemaphorePermit,
}

#[derive(Debug, Clone)]
pub struct WorkerPool {
    slots: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Creates a pool with `size` slots (at least one).
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            slots: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Slots not currently held by any task.
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// Waits for a free slot.
    ///
    /// Returns None only if the semaphore was closed, which this pool never
    /// does; callers treat it like a cancelled task.
    pub async fn acquire(&self) -> Option<WorkerSlot> {
        let permit = self.slots.clone().acquire_owned().await.ok()?;
        Some(WorkerSlot { _permit: permit })
    }
}
