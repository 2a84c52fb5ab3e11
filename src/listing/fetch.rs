// src/listing/fetch.rs
// =============================================================================
// Fetches one directory listing and parses it.
// =============================================================================

use crate::error::FetchError;
use crate::transport::Transport;

use super::parse::{parse_listing, Entry};

/// Downloads the listing page at `url` and returns its children.
///
/// Fails with the transport's error on a non-2xx status or network failure.
pub async fn fetch_entries(transport: &dyn Transport, url: &str) -> Result<Vec<Entry>, FetchError> {
    let html = transport.get_text(url).await?;
    Ok(parse_listing(&html))
}
