//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with optional retries
//! - HTML extraction into page records
//! - The depth-bounded frontier and its eligibility policy
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;

pub use coordinator::{run_crawl, Coordinator, CrawlOutcome, CrawlRequest};
pub use extractor::{extract_page, ExtractOptions};
pub use fetcher::{
    build_http_client, fetch_page, is_html_content_type, FetchError, FetchedPage, Fetcher,
    RetryPolicy,
};
pub use frontier::{Eligibility, Frontier, FrontierEntry, FrontierPolicy};
