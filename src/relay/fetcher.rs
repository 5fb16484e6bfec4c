//! HTTP fetcher for the forum listing page
//!
//! This module handles the single request a run makes:
//! - Building an HTTP client with the configured timeout
//! - Rotating a plausible browser header set on every request
//! - One immediate retry on transport failure, never more
//! - Decoding the body with the declared or configured charset

use crate::config::SourceConfig;
use crate::RelayError;
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::Client;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Total attempts per fetch: the first request plus one immediate retry
pub const MAX_FETCH_ATTEMPTS: u32 = 2;

/// Desktop browser identities rotated across requests
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36 Edg/123.0.0.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0",
];

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// The server answered; the status is not interpreted here
    Page {
        /// HTTP status code
        status: u16,
        /// Decoded page body
        body: String,
    },

    /// No response after every attempt (timeout, connection error, broken body)
    Unavailable {
        /// Description of the last failure
        error: String,
    },
}

impl FetchResult {
    /// Returns the body if the server answered with a 2xx status
    pub fn success_body(&self) -> Option<&str> {
        match self {
            Self::Page { status, body } if (200..300).contains(status) => Some(body),
            _ => None,
        }
    }
}

/// Something that can produce the listing page
///
/// Implemented by [`HttpFetcher`] for real runs and by fakes in tests.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// The URL being fetched, for logging
    fn url(&self) -> &str;

    /// Fetches the page; never fails, reporting problems as [`FetchResult::Unavailable`]
    async fn fetch(&self) -> FetchResult;
}

/// Builds an HTTP client for the listing page
///
/// # Arguments
///
/// * `config` - The source configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &SourceConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.timeout_secs);

    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the request header set, picking a fresh User-Agent each call
pub fn browser_headers(config: &SourceConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let agent = USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0]);
    headers.insert(USER_AGENT, HeaderValue::from_static(agent));
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

    if let Ok(value) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, value);
    }
    if !config.referer.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&config.referer) {
            headers.insert(REFERER, value);
        }
    }

    headers
}

/// Runs `op` up to `max_attempts` times, returning the first success
///
/// Retries are immediate. The last error is returned when every attempt fails.
pub async fn with_retry<T, E, F, Fut>(max_attempts: u32, mut op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts => {
                tracing::warn!("Attempt {}/{} failed: {}; retrying", attempt, max_attempts, e);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Fetches the configured listing page over HTTP
pub struct HttpFetcher {
    client: Client,
    config: SourceConfig,
}

impl HttpFetcher {
    /// Creates a fetcher for the listing page in `config`
    pub fn new(config: SourceConfig) -> Result<Self, RelayError> {
        let client = build_http_client(&config).map_err(|source| RelayError::Http {
            url: config.listing_url.clone(),
            source,
        })?;
        Ok(Self { client, config })
    }

    async fn fetch_once(&self) -> Result<(u16, String), RelayError> {
        let url = &self.config.listing_url;
        let to_error = |source: reqwest::Error| RelayError::Http {
            url: url.clone(),
            source,
        };

        let response = self
            .client
            .get(url)
            .headers(browser_headers(&self.config))
            .send()
            .await
            .map_err(to_error)?;

        let status = response.status().as_u16();
        let body = response
            .text_with_charset(&self.config.default_charset)
            .await
            .map_err(to_error)?;

        Ok((status, body))
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    fn url(&self) -> &str {
        &self.config.listing_url
    }

    async fn fetch(&self) -> FetchResult {
        let result = with_retry(MAX_FETCH_ATTEMPTS, |attempt| {
            tracing::debug!("Fetching {} (attempt {})", self.config.listing_url, attempt);
            self.fetch_once()
        })
        .await;

        match result {
            Ok((status, body)) => {
                tracing::debug!("Received HTTP {} ({} bytes)", status, body.len());
                FetchResult::Page { status, body }
            }
            Err(e) => FetchResult::Unavailable {
                error: e.to_string(),
            },
        }
    }
}
