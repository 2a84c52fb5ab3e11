// src/mirror/walker.rs
// =============================================================================
// The tree walker.
//
// How a directory is mirrored:
// 1. Create the local folder (create_dir_all, safe to repeat)
// 2. Take a worker slot, fetch and parse the listing, give the slot back
// 3. Spawn one task per entry into a JoinSet:
//      "sub/"  -> a recursive walk of url + "sub/" into dest/sub
//      "file"  -> a download of url + "file" into dest/file
// 4. Wait for every task in the JoinSet, summing their reports
//
// Step 4 is what gives "subtree before parent": a walk only returns once
// every task below it has finished. Because waiting happens on the JoinSet
// and not while holding a worker slot, any pool size (even 1) completes.
//
// Failure policy:
// - a failed file is recorded by the file fetcher and the walk moves on
// - a failed subdirectory (cannot create or list it) is recorded and counted,
//   its siblings and ancestors carry on
// - a failed root is returned to the caller as an error
//
// Rust concepts:
// - Arc: Shared ownership of the transport, sink and shutdown signal
// - JoinSet: A group of spawned tasks we can wait on one by one
// - BoxFuture: A recursive async fn must box its future to have a known size
// =============================================================================

use futures::future::{BoxFuture, FutureExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::file::fetch_file;
use super::pool::{WorkerPool, WorkerSlot};
use super::shutdown::Shutdown;
use super::sink::{record_failure, FailureRecord, FailureSink};
use super::task::{DownloadTask, MirrorReport, TaskKind, TaskOutcome};
use crate::error::MirrorError;
use crate::listing::fetch_entries;
use crate::transport::Transport;

/// Everything one crawl shares between its tasks.
///
/// Cloning is cheap: every field is reference counted, and each spawned task
/// gets its own clone.
#[derive(Clone)]
pub struct Mirror {
    transport: Arc<dyn Transport>,
    pool: WorkerPool,
    sink: Option<Arc<dyn FailureSink>>,
    shutdown: Arc<Shutdown>,
}

impl Mirror {
    pub fn new(transport: Arc<dyn Transport>, workers: usize) -> Self {
        Self {
            transport,
            pool: WorkerPool::new(workers),
            sink: None,
            shutdown: Shutdown::shared(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn FailureSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_shutdown(mut self, shutdown: Arc<Shutdown>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Mirrors the listing at `root_url` into `destination`.
    ///
    /// Returns once the whole tree is either on disk or recorded as failed.
    /// Only a failure of the root itself is returned as an error.
    pub async fn run(&self, root_url: &str, destination: &Path) -> Result<MirrorReport, MirrorError> {
        info!(url = root_url, workers = self.pool.size(), "Starting mirror");

        match self.walk(root_url.to_string(), destination.to_path_buf()).await {
            Ok(report) => Ok(report),
            Err(error) => {
                record_failure(self.sink(), FailureRecord::from_error(root_url, &error)).await;
                Err(error)
            }
        }
    }

    fn sink(&self) -> Option<&dyn FailureSink> {
        self.sink.as_deref()
    }

    // Waits for a worker slot, unless shutdown is requested first
    async fn acquire_slot(&self) -> Option<WorkerSlot> {
        tokio::select! {
            biased;
            _ = self.shutdown.wait() => None,
            slot = self.pool.acquire() => slot,
        }
    }

    fn walk(&self, url: String, destination: PathBuf) -> BoxFuture<'static, Result<MirrorReport, MirrorError>> {
        let mirror = self.clone();

        async move {
            let mut report = MirrorReport::default();

            tokio::fs::create_dir_all(&destination)
                .await
                .map_err(|source| MirrorError::LocalCreate {
                    path: destination.clone(),
                    source,
                })?;

            let entries = {
                let Some(_slot) = mirror.acquire_slot().await else {
                    report.skipped += 1;
                    return Ok(report);
                };

                info!("Listing {}", url);
                fetch_entries(mirror.transport.as_ref(), &url)
                    .await
                    .map_err(|source| MirrorError::ListingFetch {
                        url: url.clone(),
                        source,
                    })?
            };

            let mut children = JoinSet::new();
            for (submitted, entry) in entries.iter().enumerate() {
                if mirror.shutdown.is_requested() {
                    report.skipped += entries.len() - submitted;
                    break;
                }

                let task = DownloadTask::for_entry(&url, &destination, entry);
                debug!(url = %task.url, kind = ?task.kind, free_slots = mirror.pool.available(), "Submitting task");
                children.spawn(mirror.clone().run_task(task));
            }

            while let Some(joined) = children.join_next().await {
                match joined {
                    Ok(child) => report.merge(child),
                    Err(e) => {
                        // A panicking child must not take its parent down
                        warn!(url = %url, error = %e, "Child task did not complete");
                        let record = FailureRecord::new(url.clone(), format!("child task failed: {}", e));
                        report.failures.push(record_failure(mirror.sink(), record).await);
                    }
                }
            }

            report.directories_mirrored += 1;
            Ok(report)
        }
        .boxed()
    }

    async fn run_task(self, task: DownloadTask) -> MirrorReport {
        let mut report = MirrorReport::default();

        match task.kind {
            TaskKind::Directory => {
                match self.walk(task.url.clone(), task.destination.clone()).await {
                    Ok(subtree) => report.merge(subtree),
                    Err(error) => {
                        let record = FailureRecord::from_error(&task.url, &error);
                        report.record_failed_directory(record_failure(self.sink(), record).await);
                    }
                }
            }
            TaskKind::File => {
                let Some(_slot) = self.acquire_slot().await else {
                    report.record_file(TaskOutcome::Skipped);
                    return report;
                };

                let outcome =
                    fetch_file(self.transport.as_ref(), &task.url, &task.destination, self.sink()).await;
                report.record_file(outcome);
            }
        }

        report
    }
}
