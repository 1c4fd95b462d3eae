//! Report module for aggregating crawl results
//!
//! This module handles:
//! - Running totals while the crawl is in progress
//! - Final report assembly with page keys and derived views
//! - JSON export and the response envelope
//! - Per-state statistics for CLI output

mod aggregator;
mod analysis;
mod builder;
mod export;
mod page_map;
pub mod stats;
mod types;

pub use aggregator::{Aggregator, CrawlMeta};
pub use analysis::{content_analysis, site_structure};
pub use builder::{page_key, ReportBuilder, PAGE_KEY_LEN};
pub use export::{report_filename, serialize_report, write_report, CrawlResponse};
pub use page_map::PageMap;
pub use stats::{print_statistics, CrawlStatistics};
pub use types::{
    ContentAnalysis, ContentVolume, CrawlCompletion, CrawlReport, CrawlSummary, FormInput,
    FormRecord, ImageRecord, KeywordCount, LinkCount, LinkRecord, ListRecord, PageRecord,
    SiteStructure, TableRecord, TextContent,
};
