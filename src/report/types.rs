//! Report data model
//!
//! Field names and order follow the JSON report schema consumed by callers.
//! Fields beyond the core schema carry `#[serde(default)]` so a report that
//! only has the core fields still deserializes.

use crate::config::NonHtmlPolicy;
use crate::report::page_map::PageMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structured extraction result for one successfully fetched page
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub links_found: usize,
    pub images_found: usize,
    pub tables_found: usize,
    #[serde(default)]
    pub forms_found: usize,
    pub text_content: TextContent,
    pub links: Vec<LinkRecord>,
    pub images: Vec<ImageRecord>,
    #[serde(default)]
    pub tables: Vec<TableRecord>,
    #[serde(default)]
    pub forms: Vec<FormRecord>,
    #[serde(default)]
    pub headings_structure: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl PageRecord {
    /// A record with no extracted content, used for non-HTML pages under
    /// the `record-empty` policy
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Text extracted from a page
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextContent {
    pub paragraphs: Vec<String>,
    pub total_word_count: usize,
    #[serde(default)]
    pub lists: Vec<ListRecord>,
    #[serde(default)]
    pub bold_text: Vec<String>,
    #[serde(default)]
    pub italic_text: Vec<String>,
    #[serde(default)]
    pub code_blocks: Vec<String>,
    #[serde(default)]
    pub quotes: Vec<String>,
}

/// A `<ul>` or `<ol>` with its item texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub alt: String,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableRecord {
    pub caption: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecord {
    pub action: String,
    pub method: String,
    pub inputs: Vec<FormInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub placeholder: String,
    pub value: String,
    pub required: bool,
}

/// Why the crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlCompletion {
    /// Frontier drained with every level explored
    #[default]
    Exhausted,
    /// The global page cap was reached
    PageLimit,
    /// Cancelled explicitly or by the crawl deadline
    Cancelled,
}

/// Aggregate statistics for a crawl
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub total_pages_crawled: usize,
    pub total_links_found: usize,
    pub total_images_found: usize,
    pub total_tables_found: usize,
    pub total_words_extracted: usize,
    pub crawl_duration_seconds: f64,
    #[serde(default)]
    pub total_forms_found: usize,
    #[serde(default)]
    pub start_url: String,
    #[serde(default)]
    pub base_domain: String,
    #[serde(default)]
    pub max_depth: u32,
    #[serde(default)]
    pub max_depth_reached: u32,
    #[serde(default)]
    pub non_html_policy: NonHtmlPolicy,
    #[serde(default)]
    pub completion: CrawlCompletion,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Link-graph view of the crawled pages
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SiteStructure {
    /// Internal URLs most often linked to, most-linked first
    pub most_linked_pages: Vec<LinkCount>,
    pub page_titles: Vec<String>,
    /// External hosts linked from any page, sorted
    pub unique_domains_linked: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCount {
    pub url: String,
    pub count: usize,
}

/// Content view of the crawled pages
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub total_content_volume: ContentVolume,
    pub content_types_present: Vec<String>,
    pub common_keywords: Vec<KeywordCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentVolume {
    pub words: usize,
    pub paragraphs: usize,
    pub images: usize,
    pub tables: usize,
    pub forms: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

/// The complete, serializable result of one crawl
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CrawlReport {
    pub crawl_summary: CrawlSummary,
    /// Page keys grouped by the depth they were found at
    #[serde(default)]
    pub pages_by_depth: BTreeMap<u32, Vec<String>>,
    #[serde(default)]
    pub site_structure: SiteStructure,
    #[serde(default)]
    pub content_analysis: ContentAnalysis,
    pub detailed_pages: PageMap,
}
