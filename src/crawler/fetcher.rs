//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Single GET requests with a Content-Type check
//! - Optional retry logic for transient failures
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::state::PageState;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Media types the extractor can parse
const HTML_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// A page fetched successfully with an HTML body
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value, if any
    pub content_type: Option<String>,
    /// Page body
    pub body: String,
}

/// Typed fetch failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Connection to {url} failed: {message}")]
    Connection { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("{url} is not HTML (Content-Type: {content_type})")]
    UnsupportedContentType { url: String, content_type: String },

    #[error("Redirect error for {url}: {message}")]
    Redirect { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchError {
    /// The terminal page state this failure maps to
    pub fn page_state(&self) -> PageState {
        match self {
            Self::Timeout { .. } => PageState::Timeout,
            Self::Connection { .. } => PageState::Unreachable,
            Self::Http { status: 404 | 410, .. } => PageState::DeadLink,
            Self::Http { .. } => PageState::HttpError,
            Self::UnsupportedContentType { .. } => PageState::ContentMismatch,
            Self::Redirect { .. } | Self::Body { .. } => PageState::Failed,
        }
    }

    /// Returns true for failures worth retrying: timeouts, connection
    /// errors and 5xx responses
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connection { .. } => true,
            Self::Http { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }

    fn from_reqwest(url: &Url, e: reqwest::Error) -> Self {
        let url = url.to_string();
        if e.is_timeout() {
            Self::Timeout { url }
        } else if e.is_redirect() {
            Self::Redirect {
                url,
                message: e.to_string(),
            }
        } else {
            Self::Connection {
                url,
                message: e.to_string(),
            }
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawler` - Timeouts and redirect limits
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use deep_crawl::config::{CrawlerConfig, UserAgentConfig};
/// use deep_crawl::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(crawler.request_timeout_secs);

    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(crawler.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if a Content-Type header value names an HTML media type
///
/// A missing header is treated as HTML.
pub fn is_html_content_type(content_type: Option<&str>) -> bool {
    let Some(value) = content_type else {
        return true;
    };
    let media_type = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    HTML_TYPES.contains(&media_type.as_str())
}

/// Fetches a URL with a single GET, no retries
///
/// # Outcomes
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with HTML or no Content-Type | `Ok(FetchedPage)` |
/// | 2xx with another Content-Type | `UnsupportedContentType` |
/// | Any other status after redirects | `Http` |
/// | Client timeout | `Timeout` |
/// | Too many redirects | `Redirect` |
/// | DNS, TLS, refused connection | `Connection` |
/// | Body decode failure | `Body` |
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        return Err(FetchError::Http {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if !is_html_content_type(content_type.as_deref()) {
        return Err(FetchError::UnsupportedContentType {
            url: url.to_string(),
            content_type: content_type.unwrap_or_default(),
        });
    }

    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Body {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    })?;

    Ok(FetchedPage {
        final_url,
        status: status.as_u16(),
        content_type,
        body,
    })
}

/// How many times a retryable failure is re-attempted, and the pause
/// between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Single attempt
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Shared fetch handle used by crawl workers
///
/// Cloning is cheap; the underlying client shares its connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
    request_delay: Duration,
}

impl Fetcher {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self {
            client,
            retry,
            request_delay: Duration::ZERO,
        }
    }

    /// Builds the client and retry policy from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, crawler)?;
        Ok(Self::new(client, RetryPolicy::from_config(crawler))
            .with_request_delay(Duration::from_millis(crawler.request_delay_ms)))
    }

    /// Pause before every request
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Fetches `url`, retrying transient failures per the retry policy
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let mut attempt = 0;
        loop {
            if !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            match fetch_page(&self.client, url).await {
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    tracing::debug!(
                        "Retrying {} ({}/{}): {}",
                        url,
                        attempt,
                        self.retry.max_retries,
                        e
                    );
                    tokio::time::sleep(self.retry.delay).await;
                }
                result => return result,
            }
        }
    }
}
