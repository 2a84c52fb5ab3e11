// src/mirror/sink.rs
// =============================================================================
// Failure recording.
//
// Every failed download (and every directory branch that could not be
// listed or created) becomes one FailureRecord. Records go to an optional
// FailureSink shared by all workers. The file-backed sink keeps the log open
// for the whole crawl and serializes writers with a mutex, so lines from
// concurrent workers never interleave.
//
// Log line format:
//   Failed to fetch <url>. Error: <message>
// =============================================================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::MirrorError;

/// One failed URL and why it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub url: String,
    pub message: String,
}

impl FailureRecord {
    pub fn new(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Record for a failed branch or file. `url` is used when the error
    /// itself carries no URL (local directory creation).
    pub fn from_error(url: &str, error: &MirrorError) -> Self {
        Self::new(error.url_or(url), error.cause_message())
    }

    pub fn log_line(&self) -> String {
        format!("Failed to fetch {}. Error: {}\n", self.url, self.message)
    }
}

/// Append-only destination for failure records, shared by all workers.
#[async_trait]
pub trait FailureSink: Send + Sync {
    async fn append(&self, record: &FailureRecord) -> std::io::Result<()>;
}

/// Failure log file opened once in append mode.
#[derive(Debug)]
pub struct FailureLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl FailureLog {
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path).await?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FailureSink for FailureLog {
    async fn append(&self, record: &FailureRecord) -> std::io::Result<()> {
        let mut file = self.file.lock().await;
        file.write_all(record.log_line().as_bytes()).await?;
        file.flush().await
    }
}

/// Logs a failure and appends it to `sink` if there is one.
///
/// A sink write error is only logged; it must not turn a recorded failure
/// into a crash.
pub async fn record_failure(sink: Option<&dyn FailureSink>, record: FailureRecord) -> FailureRecord {
    warn!(url = %record.url, error = %record.message, "Failed to fetch");

    if let Some(sink) = sink {
        if let Err(e) = sink.append(&record).await {
            warn!(error = %e, "Could not write to failure log");
        }
    }

    record
}

/// Collects records in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    records: std::sync::Mutex<Vec<FailureRecord>>,
}

#[cfg(test)]
impl MemorySink {
    pub fn records(&self) -> Vec<FailureRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl FailureSink for MemorySink {
    async fn append(&self, record: &FailureRecord) -> std::io::Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_log_line_format() {
        let record = FailureRecord::new("http://host/data/a.fits", "HTTP 404 Not Found");
        assert_eq!(
            record.log_line(),
            "Failed to fetch http://host/data/a.fits. Error: HTTP 404 Not Found\n"
        );
    }

    #[tokio::test]
    async fn test_failure_log_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failures.log");
        std::fs::write(&path, "earlier line\n").unwrap();

        let log = FailureLog::open(&path).await.unwrap();
        log.append(&FailureRecord::new("http://h/x", "boom")).await.unwrap();
        assert_eq!(log.path(), path.as_path());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "earlier line\nFailed to fetch http://h/x. Error: boom\n");
    }

    #[tokio::test]
    async fn test_concurrent_writers_keep_whole_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failures.log");
        let log = Arc::new(FailureLog::open(&path).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..32 {
            let log = log.clone();
            handles.push(tokio::spawn(async move {
                let record = FailureRecord::new(format!("http://h/file{}", i), "connection reset");
                log.append(&record).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 32);
        for line in lines {
            assert!(line.starts_with("Failed to fetch http://h/file"));
            assert!(line.ends_with(". Error: connection reset"));
        }
    }

    #[tokio::test]
    async fn test_record_failure_without_sink() {
        let record = record_failure(None, FailureRecord::new("http://h/y", "gone")).await;
        assert_eq!(record.url, "http://h/y");
    }
}
