// src/transport/http.rs
// =============================================================================
// reqwest-backed Transport.
//
// One Client is built per crawl and shared by every task (Client is an Arc
// internally, so this also gives us connection pooling). Credentials are
// attached in exactly one place, request(), so listing fetches and file
// downloads always carry the same Authorization header.
// =============================================================================

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

use super::{ByteStream, Transport};
use crate::config::Credentials;
use crate::error::FetchError;

pub struct HttpTransport {
    client: Client,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    /// Builds the shared client.
    ///
    /// `connect_timeout` bounds connection setup only. Bodies of large files
    /// may take arbitrarily long to stream, so there is no total timeout.
    pub fn new(connect_timeout: Duration, credentials: Option<Credentials>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, credentials })
    }

    // Every outbound request is built here
    fn request(&self, url: &str) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.credentials {
            Some(creds) => request.basic_auth(&creds.username, Some(&creds.password)),
            None => request,
        }
    }

    async fn send(&self, url: &str) -> Result<Response, FetchError> {
        let response = self.request(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.send(url).await?;
        Ok(response.text().await?)
    }

    async fn get_stream(&self, url: &str) -> Result<ByteStream, FetchError> {
        let response = self.send(url).await?;
        Ok(response.bytes_stream().map_err(FetchError::from).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::AUTHORIZATION;

    fn transport(credentials: Option<Credentials>) -> HttpTransport {
        HttpTransport::new(Duration::from_secs(5), credentials).unwrap()
    }

    #[test]
    fn test_credentials_attached() {
        let transport = transport(Some(Credentials::new("alice", "secret")));
        let request = transport.request("http://example.com/data/").build().unwrap();

        let header = request.headers().get(AUTHORIZATION).unwrap();
        assert_eq!(header.to_str().unwrap(), "Basic YWxpY2U6c2VjcmV0");
    }

    #[test]
    fn test_same_header_for_listing_and_file() {
        let transport = transport(Some(Credentials::new("alice", "secret")));
        let listing = transport.request("http://example.com/data/").build().unwrap();
        let file = transport.request("http://example.com/data/a.fits").build().unwrap();

        assert_eq!(
            listing.headers().get(AUTHORIZATION),
            file.headers().get(AUTHORIZATION)
        );
    }

    #[test]
    fn test_no_credentials_no_header() {
        let transport = transport(None);
        let request = transport.request("http://example.com/").build().unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }
}
