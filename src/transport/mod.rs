// src/transport/mod.rs
// =============================================================================
// The HTTP seam of the mirror.
//
// Everything that talks to the network goes through the Transport trait:
// - get_text: fetch a whole (small) body, used for listing pages
// - get_stream: fetch a body chunk by chunk, used for file downloads
//
// The production implementation (http.rs) wraps a reqwest Client and attaches
// credentials to every request. Tests use an in-memory MockTransport instead,
// so the walker can be exercised without a web server.
//
// Rust concepts:
// - Traits: A shared interface with several implementations
// - Trait objects (dyn Transport): Pick the implementation at runtime
// - async-trait: Async methods on traits that are used behind dyn
// =============================================================================

mod http;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::FetchError;

pub use http::HttpTransport;

/// A response body delivered as a sequence of chunks, in receive order.
pub type ByteStream = BoxStream<'static, Result<Bytes, FetchError>>;

/// Issues GET requests for the crawl.
///
/// Implementations must treat any non-2xx status as [`FetchError::Status`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches the whole body of `url` as text.
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;

    /// Opens `url` and returns its body as a stream of chunks.
    async fn get_stream(&self, url: &str) -> Result<ByteStream, FetchError>;
}
