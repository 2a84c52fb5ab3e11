// src/mirror/task.rs
// =============================================================================
// Units of work and their results.
//
// A DownloadTask is what the walker submits for every listing entry: either
// a recursive walk of a subdirectory or a single file download. Each task
// ends in a TaskOutcome, and outcomes are summed into a MirrorReport that
// bubbles up the tree as directory tasks finish.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::sink::FailureRecord;
use crate::listing::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Directory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub kind: TaskKind,
    pub url: String,
    pub destination: PathBuf,
}

impl DownloadTask {
    /// Task for `entry` found in the listing at `base_url`, stored under
    /// `base_dir`.
    ///
    /// `base_url` ends with '/', so the child URL is a plain concatenation.
    pub fn for_entry(base_url: &str, base_dir: &Path, entry: &Entry) -> Self {
        let kind = if entry.is_directory {
            TaskKind::Directory
        } else {
            TaskKind::File
        };

        Self {
            kind,
            url: format!("{}{}", base_url, entry.name),
            destination: base_dir.join(entry.local_name()),
        }
    }
}

/// Terminal state of one file task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Failed(FailureRecord),
    /// Never started because shutdown was requested
    Skipped,
}

/// Totals for one directory subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorReport {
    pub directories_mirrored: usize,
    pub directories_failed: usize,
    pub files_downloaded: usize,
    pub files_failed: usize,
    pub skipped: usize,
    pub failures: Vec<FailureRecord>,
}

impl MirrorReport {
    pub fn record_file(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Completed => self.files_downloaded += 1,
            TaskOutcome::Failed(record) => {
                self.files_failed += 1;
                self.failures.push(record);
            }
            TaskOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn record_failed_directory(&mut self, record: FailureRecord) {
        self.directories_failed += 1;
        self.failures.push(record);
    }

    /// Adds a child subtree's totals to this one.
    pub fn merge(&mut self, other: MirrorReport) {
        self.directories_mirrored += other.directories_mirrored;
        self.directories_failed += other.directories_failed;
        self.files_downloaded += other.files_downloaded;
        self.files_failed += other.files_failed;
        self.skipped += other.skipped;
        self.failures.extend(other.failures);
    }

    /// True when nothing failed and nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.skipped == 0
    }
}
