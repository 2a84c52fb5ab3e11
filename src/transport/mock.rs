// src/transport/mock.rs
// =============================================================================
// In-memory Transport for tests.
//
// Serves a fixed map of URL -> response, optionally after a delay (one for
// every URL, or per URL), and keeps a log of every request so tests can
// check how often each URL was hit, when it was answered and how many
// requests were in flight at the same time.
// =============================================================================

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::{ByteStream, Transport};
use crate::error::FetchError;

enum Route {
    Body(Vec<u8>),
    Status(StatusCode),
    Broken(String),
}

type Hook = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct MockTransport {
    routes: HashMap<String, Route>,
    hooks: HashMap<String, Hook>,
    latency: Duration,
    slow: HashMap<String, Duration>,
    requests: Mutex<Vec<String>>,
    served_at: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every response by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Delays `url` by `latency` instead of the default
    pub fn slow(mut self, url: &str, latency: Duration) -> Self {
        self.slow.insert(url.to_string(), latency);
        self
    }

    /// Serves an nginx-style autoindex page linking to `hrefs`
    pub fn listing(mut self, url: &str, hrefs: &[&str]) -> Self {
        self.routes
            .insert(url.to_string(), Route::Body(autoindex_page(url, hrefs).into_bytes()));
        self
    }

    pub fn file(mut self, url: &str, body: &[u8]) -> Self {
        self.routes.insert(url.to_string(), Route::Body(body.to_vec()));
        self
    }

    pub fn status(mut self, url: &str, status: StatusCode) -> Self {
        self.routes.insert(url.to_string(), Route::Status(status));
        self
    }

    /// Fails the request as if the connection dropped
    pub fn broken(mut self, url: &str, message: &str) -> Self {
        self.routes.insert(url.to_string(), Route::Broken(message.to_string()));
        self
    }

    /// Runs `hook` right after `url` has been served
    pub fn on_served(mut self, url: &str, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks.insert(url.to_string(), Box::new(hook));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, url: &str) -> usize {
        self.requests().iter().filter(|u| u.as_str() == url).count()
    }

    pub fn last_served(&self) -> Option<Instant> {
        self.served_at.lock().unwrap().iter().map(|(_, at)| *at).max()
    }

    /// When the last response for a URL starting with `prefix` went out
    pub fn last_served_under(&self, prefix: &str) -> Option<Instant> {
        self.served_at
            .lock()
            .unwrap()
            .iter()
            .filter(|(url, _)| url.starts_with(prefix))
            .map(|(_, at)| *at)
            .max()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn serve(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let latency = self.slow.get(url).copied().unwrap_or(self.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let result = match self.routes.get(url) {
            Some(Route::Body(body)) => Ok(body.clone()),
            Some(Route::Status(status)) => Err(FetchError::Status { status: *status }),
            Some(Route::Broken(message)) => Err(FetchError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                message.clone(),
            ))),
            None => Err(FetchError::Status {
                status: StatusCode::NOT_FOUND,
            }),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.served_at.lock().unwrap().push((url.to_string(), Instant::now()));
        if let Some(hook) = self.hooks.get(url) {
            hook();
        }
        result
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let body = self.serve(url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    async fn get_stream(&self, url: &str) -> Result<ByteStream, FetchError> {
        let body = self.serve(url).await?;
        // Small chunks so writers see more than one
        let chunks: Vec<Result<Bytes, FetchError>> = body
            .chunks(4)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        Ok(stream::iter(chunks).boxed())
    }
}

/// Renders a page shaped like nginx `autoindex on` output
pub fn autoindex_page(url: &str, hrefs: &[&str]) -> String {
    let mut html = format!(
        "<html>\r\n<head><title>Index of {url}</title></head>\r\n<body>\r\n<h1>Index of {url}</h1><hr><pre>"
    );
    for href in hrefs {
        html.push_str(&format!(
            "<a href=\"{href}\">{href}</a>                 17-Oct-2026 10:00       -\r\n"
        ));
    }
    html.push_str("</pre><hr></body>\r\n</html>\r\n");
    html
}
