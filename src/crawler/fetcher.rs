//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with browser-like request headers
//! - Bounding the number of requests in flight with a semaphore
//! - The optional per-request delay
//! - Classifying failures into [`FetchError`] variants
//!
//! There is no retry logic: a failed page is dropped for the rest of the run.

use crate::config::CrawlConfig;
use crate::crawler::extractor::Document;
use crate::{ConfigError, DocsMapperError, FetchError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, CONTENT_TYPE};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Builds an HTTP client from the `[http]` and `[crawler]` settings
///
/// Accept-Encoding is left to reqwest: its gzip/brotli support only
/// decompresses responses when it negotiated the encoding itself.
///
/// # Example
///
/// ```no_run
/// use docs_mapper::config::CrawlConfig;
/// use docs_mapper::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlConfig) -> Result<Client, DocsMapperError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value("accept", &config.http.accept)?);
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value("accept-language", &config.http.accept_language)?,
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    let timeout = config.crawler.request_timeout();

    let client = Client::builder()
        .user_agent(config.http.user_agent.as_str())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value)
        .map_err(|e| ConfigError::Validation(format!("Invalid {} header value: {}", name, e)))
}

/// Fetches pages under a shared concurrency limit
///
/// One `Fetcher` is shared (behind an `Arc`) by every task of a crawl; its
/// semaphore is the only place where tasks wait on each other.
pub struct Fetcher {
    client: Client,
    limiter: Arc<Semaphore>,
    max_concurrency: usize,
    request_delay: Duration,
}

impl Fetcher {
    /// Creates a fetcher with a freshly built HTTP client
    pub fn new(config: &CrawlConfig) -> Result<Self, DocsMapperError> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, config: &CrawlConfig) -> Self {
        let max_concurrency = config.crawler.max_concurrency.max(1) as usize;
        Self {
            client,
            limiter: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
            request_delay: config.crawler.request_delay(),
        }
    }

    /// Number of fetches currently holding a slot
    pub fn in_flight(&self) -> usize {
        self.max_concurrency - self.limiter.available_permits()
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Fetches and parses one page
    ///
    /// # Request Flow
    ///
    /// 1. Wait for a free slot (the backpressure point)
    /// 2. Sleep for the configured request delay, if any
    /// 3. GET the URL (redirects followed by the client)
    /// 4. Reject non-2xx statuses and non-HTML content types
    /// 5. Parse the body into a [`Document`]
    ///
    /// # Error Classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Request or body read timed out | `Timeout` |
    /// | Connection refused / DNS / TLS / reset | `Connection` |
    /// | Non-2xx status | `HttpStatus` |
    /// | Non-HTML content type, undecodable body | `Parse` |
    pub async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| FetchError::Connection {
                url: url.to_string(),
                message: "fetcher is shut down".to_string(),
            })?;

        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        tracing::debug!("Fetching: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if let Some(content_type) = content_type {
            if !is_html_content_type(&content_type) {
                return Err(FetchError::Parse {
                    url: url.to_string(),
                    message: format!("expected HTML, got {}", content_type),
                });
            }
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(Document::parse(&body, final_url))
    }
}

/// HTML or XHTML; a missing header is treated as HTML by the caller
fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Maps a reqwest error onto the fetch failure taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    let url = url.to_string();
    if error.is_timeout() {
        FetchError::Timeout { url }
    } else if error.is_decode() {
        FetchError::Parse {
            url,
            message: error.to_string(),
        }
    } else {
        FetchError::Connection {
            url,
            message: error.to_string(),
        }
    }
}
