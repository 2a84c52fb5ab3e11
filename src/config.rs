// src/config.rs
// =============================================================================
// Crawl configuration.
//
// Everything here is decided once, before the crawl starts, and never
// changes afterwards. The CLI builds a MirrorConfig and hands it to the
// walker; credentials are moved into the transport.
// =============================================================================

use anyhow::{anyhow, Result};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default number of concurrent network operations
pub const DEFAULT_WORKERS: usize = 5;

/// Default connect timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Size of the buffered writer used for downloaded files
pub const CHUNK_SIZE: usize = 8192;

/// HTTP Basic credentials applied to every request of one crawl.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Builds credentials only when both halves are present.
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        match (username, password) {
            (Some(username), Some(password)) => Some(Self::new(username, password)),
            _ => None,
        }
    }
}

// Keep passwords out of logs and panic messages
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Settings of one mirror run.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Root listing URL, always ending with '/'
    pub root_url: String,
    /// Local directory the tree is mirrored into
    pub destination: PathBuf,
    /// Worker pool size (at least 1)
    pub workers: usize,
    /// Connect timeout applied to every request
    pub timeout: Duration,
    /// Optional failure log file
    pub log_path: Option<PathBuf>,
}

impl MirrorConfig {
    pub fn new(root_url: &str, destination: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            root_url: normalize_root_url(root_url)?,
            destination: destination.into(),
            workers: DEFAULT_WORKERS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_path: None,
        })
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_log_path(mut self, log_path: Option<PathBuf>) -> Self {
        self.log_path = log_path;
        self
    }
}

/// Validates the root listing URL and makes sure it ends with '/'.
///
/// A listing URL without the trailing slash would make `url + name` point at
/// a sibling of the listing instead of a child.
pub fn normalize_root_url(raw: &str) -> Result<String> {
    let mut parsed = Url::parse(raw).map_err(|e| anyhow!("Invalid URL '{}': {}", raw, e))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(anyhow!("Unsupported URL scheme '{}': {}", parsed.scheme(), raw));
    }

    // Children are formed by appending to the URL, so a query or fragment
    // would end up in front of every child name
    parsed.set_query(None);
    parsed.set_fragment(None);

    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }
    Ok(parsed.to_string())
}
