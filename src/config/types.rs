use crate::url::CrawlScope;
use serde::{Deserialize, Serialize};

/// Main configuration structure for Deep-Crawl
///
/// Every section and key is optional; missing values fall back to the
/// defaults below, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Depth used when a request does not specify one
    pub max_depth: u32,

    /// Global safety cap on the number of pages in a report
    pub max_total_pages: usize,

    /// Maximum number of links enqueued from a single page (0 = unlimited)
    pub max_links_per_page: usize,

    /// Size of the fetch worker pool
    pub concurrency: usize,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Crawl-level deadline (seconds, 0 disables it)
    pub crawl_timeout_secs: u64,

    /// Delay before each fetch (milliseconds)
    pub request_delay_ms: u64,

    /// Retries for transient fetch failures
    pub max_retries: u32,

    /// Delay between retries (milliseconds)
    pub retry_delay_ms: u64,

    /// Redirect hops followed per request
    pub max_redirects: usize,

    /// Which hosts discovered links may point at
    pub scope: CrawlScope,

    /// What to do with pages that are not HTML
    pub non_html: NonHtmlPolicy,

    /// Path extensions that are never enqueued
    pub skip_extensions: Vec<String>,

    /// Shortest paragraph kept by the extractor (characters)
    pub min_paragraph_chars: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_total_pages: 50,
            max_links_per_page: 10,
            concurrency: 4,
            request_timeout_secs: 10,
            crawl_timeout_secs: 0,
            request_delay_ms: 0,
            max_retries: 0,
            retry_delay_ms: 500,
            max_redirects: 10,
            scope: CrawlScope::SameHost,
            non_html: NonHtmlPolicy::Skip,
            skip_extensions: ["pdf", "jpg", "jpeg", "png", "gif", "zip", "exe"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_paragraph_chars: 11,
        }
    }
}

/// Handling of responses whose Content-Type is not HTML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NonHtmlPolicy {
    /// Leave the page out of the report
    #[default]
    Skip,
    /// Record the page with no extracted content
    RecordEmpty,
}

impl NonHtmlPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::RecordEmpty => "record-empty",
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler (optional)
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "DeepCrawl".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: String::new(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL)`, the contact part omitted
    /// when no URL is configured.
    pub fn header_value(&self) -> String {
        if self.contact_url.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, self.contact_url
            )
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory receiving `crawl_report_<domain>.json` files
    pub report_dir: String,

    /// Pretty-print report JSON
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_dir: "./reports".to_string(),
            pretty: true,
        }
    }
}
