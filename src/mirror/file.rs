// src/mirror/file.rs
// =============================================================================
// Downloads one file.
//
// The body is streamed straight to disk through an 8 KiB buffered writer,
// in the order the chunks arrive. An existing file at the destination is
// truncated and overwritten, so running the mirror twice gives the same
// result as running it once.
//
// Nothing escapes this function as an error: a failure is logged, appended
// to the failure sink (when there is one) and returned as
// TaskOutcome::Failed.
// =============================================================================

use futures::StreamExt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

use super::sink::{record_failure, FailureRecord, FailureSink};
use super::task::TaskOutcome;
use crate::config::CHUNK_SIZE;
use crate::error::{FetchError, MirrorError};
use crate::transport::Transport;

/// Fetches `url` into `destination`, converting any failure into a record.
pub async fn fetch_file(
    transport: &dyn Transport,
    url: &str,
    destination: &Path,
    sink: Option<&dyn FailureSink>,
) -> TaskOutcome {
    info!("Downloading {}", url);

    match download(transport, url, destination).await {
        Ok(bytes) => {
            debug!(url, bytes, "Download complete");
            TaskOutcome::Completed
        }
        Err(source) => {
            let error = MirrorError::FileFetch {
                url: url.to_string(),
                source,
            };
            TaskOutcome::Failed(record_failure(sink, FailureRecord::from_error(url, &error)).await)
        }
    }
}

// Returns the number of bytes written
async fn download(transport: &dyn Transport, url: &str, destination: &Path) -> Result<u64, FetchError> {
    // Open the remote side first so a 404 never truncates an existing file
    let mut body = transport.get_stream(url).await?;

    let file = File::create(destination).await?;
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut written = 0u64;

    let result = async {
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;
        Ok::<_, FetchError>(())
    }
    .await;

    if let Err(e) = result {
        // Drop the partial file; the failure log is the durable record
        drop(writer);
        let _ = tokio::fs::remove_file(destination).await;
        return Err(e);
    }

    Ok(written)
}
