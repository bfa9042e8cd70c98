// src/fetch/mod.rs

use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Desktop Chrome identity; the source rejects obvious bot agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid source URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("GET {url} returned 404 Not Found")]
    NotFound { url: Url },
    #[error("GET {url} returned 403 Forbidden")]
    Forbidden { url: Url },
    #[error("GET {url} returned server error {status}")]
    ServerError { url: Url, status: u16 },
    #[error("GET {url} returned unexpected status {status}")]
    UnexpectedStatus { url: Url, status: u16 },
    #[error("GET {url} timed out")]
    Timeout {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("GET {url} failed: {source}")]
    Transport {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("building HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// Classifies a non-200 status.
    fn from_status(url: Url, status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => FetchError::NotFound { url },
            StatusCode::FORBIDDEN => FetchError::Forbidden { url },
            s if s.is_server_error() => FetchError::ServerError {
                url,
                status: s.as_u16(),
            },
            s => FetchError::UnexpectedStatus {
                url,
                status: s.as_u16(),
            },
        }
    }

    fn from_transport(url: Url, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            FetchError::Timeout { url, source }
        } else {
            FetchError::Transport { url, source }
        }
    }

    /// Status code carried by the failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::NotFound { .. } => Some(404),
            FetchError::Forbidden { .. } => Some(403),
            FetchError::ServerError { status, .. } | FetchError::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Single-shot page downloader for one fixed source.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    url: Url,
}

impl Fetcher {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let url = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// GET the source page once. Anything but 200 is an error.
    #[instrument(level = "info", skip(self), fields(url = %self.url))]
    pub async fn fetch_page(&self) -> Result<String, FetchError> {
        info!("fetching source page");
        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_transport(self.url.clone(), e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "source page not available");
            return Err(FetchError::from_status(self.url.clone(), status));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::from_transport(self.url.clone(), e))?;
        debug!(bytes = body.len(), "downloaded source page");
        Ok(body)
    }
}
