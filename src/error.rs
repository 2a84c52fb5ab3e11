// src/error.rs
// =============================================================================
// Error types for the mirror.
//
// Two layers:
// - FetchError: what the transport reports for a single GET (bad status,
//   network failure, or a local I/O failure while consuming the body)
// - MirrorError: which step of the crawl failed (listing, file, local dir)
//
// main.rs wraps these in anyhow for the final report, the same way the rest
// of the application glue uses anyhow::Result.
// =============================================================================

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of one HTTP GET, as seen through the [`Transport`](crate::transport::Transport) seam.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The server answered with a non-2xx status
    #[error("HTTP {status}")]
    Status { status: StatusCode },

    /// The request never completed (DNS, connect, TLS, timeout, body read)
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// Local I/O failure, e.g. while writing a downloaded chunk
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Failure of one step of the crawl.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// A directory listing could not be fetched
    #[error("failed to fetch listing {url}: {source}")]
    ListingFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// A single file could not be downloaded
    #[error("failed to fetch file {url}: {source}")]
    FileFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// A destination directory could not be created
    #[error("failed to create directory {}: {source}", path.display())]
    LocalCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MirrorError {
    /// The URL of the branch this error belongs to.
    ///
    /// `LocalCreate` has no URL of its own, so the caller passes the URL of
    /// the listing that would have been stored there.
    pub fn url_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            MirrorError::ListingFetch { url, .. } | MirrorError::FileFetch { url, .. } => url,
            MirrorError::LocalCreate { .. } => fallback,
        }
    }

    /// The message written to the failure log (the underlying cause only).
    pub fn cause_message(&self) -> String {
        match self {
            MirrorError::ListingFetch { source, .. } | MirrorError::FileFetch { source, .. } => {
                source.to_string()
            }
            MirrorError::LocalCreate { path, source } => {
                format!("cannot create {}: {}", path.display(), source)
            }
        }
    }
}
