use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::decode::decode_listing;
use crate::links::extract_hrefs;
use crate::types::{FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            user_agent: concat!("listing-mirror/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Shared HTTP client for every remote operation of a run: listing pages,
/// header-only size probes, and streaming file transfers. Built once from
/// the settings; all calls are bounded by the configured timeouts.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    client: reqwest::Client,
}

impl RemoteClient {
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client })
    }

    /// GET a listing page and return every hyperlink target found on it.
    ///
    /// Errors are typed rather than swallowed; the walker turns them into
    /// an empty link set with a warning.
    pub async fn fetch_listing(&self, url: &Url) -> Result<Vec<String>, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        let decoded = decode_listing(&body, content_type.as_deref());
        Ok(extract_hrefs(&decoded.html))
    }

    /// Byte length of a remote file, resolved without transferring its
    /// body: HEAD first, then a streaming GET read only as far as the
    /// headers. Any error on either path yields `None`: unknown size, not
    /// a failure.
    pub async fn remote_size(&self, url: &Url) -> Option<u64> {
        if let Ok(response) = self.client.head(url.clone()).send().await {
            if response.status().is_success() {
                if let Some(length) = content_length(&response) {
                    return Some(length);
                }
            }
        }

        // Some servers refuse HEAD; fall back to a GET whose body is
        // dropped unread.
        let response = self.client.get(url.clone()).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        content_length(&response)
    }

    /// Stream a file body into `sink`, returning the byte count written.
    /// The sink is left flushed and durable but not installed anywhere;
    /// atomic promotion is the downloader's job.
    pub async fn fetch_to_file(&self, url: &Url, sink: &Path) -> Result<u64, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let mut file = tokio::fs::File::create(sink).await.map_err(map_io_error)?;
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            file.write_all(&chunk).await.map_err(map_io_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(map_io_error)?;
        file.sync_all().await.map_err(map_io_error)?;
        Ok(written)
    }
}

fn content_length(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

fn map_io_error(err: std::io::Error) -> FetchError {
    FetchError::new(FailureKind::Io, err.to_string())
}
