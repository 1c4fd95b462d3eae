//! Running crawl totals
//!
//! The coordinator owns a single `Aggregator` and records each accepted page
//! exactly once, in visitation order.

use crate::config::NonHtmlPolicy;
use crate::report::types::{CrawlCompletion, CrawlSummary, PageRecord};
use chrono::{DateTime, Utc};
use std::time::Instant;

/// Fixed facts about the crawl that end up in the summary
#[derive(Debug, Clone)]
pub struct CrawlMeta {
    pub start_url: String,
    pub base_domain: String,
    pub max_depth: u32,
    pub non_html_policy: NonHtmlPolicy,
}

#[derive(Debug)]
pub struct Aggregator {
    meta: CrawlMeta,
    started: Instant,
    started_at: DateTime<Utc>,
    pages: usize,
    links: usize,
    images: usize,
    tables: usize,
    forms: usize,
    words: usize,
    max_depth_reached: u32,
}

impl Aggregator {
    /// Starts the crawl clock
    pub fn new(meta: CrawlMeta) -> Self {
        Self {
            meta,
            started: Instant::now(),
            started_at: Utc::now(),
            pages: 0,
            links: 0,
            images: 0,
            tables: 0,
            forms: 0,
            words: 0,
            max_depth_reached: 0,
        }
    }

    /// Adds one accepted page to the totals
    pub fn record(&mut self, page: &PageRecord, depth: u32) {
        self.pages += 1;
        self.links += page.links_found;
        self.images += page.images_found;
        self.tables += page.tables_found;
        self.forms += page.forms_found;
        self.words += page.text_content.total_word_count;
        self.max_depth_reached = self.max_depth_reached.max(depth);
    }

    /// Stops the clock and produces the summary
    pub fn finish(&self, completion: CrawlCompletion) -> CrawlSummary {
        CrawlSummary {
            total_pages_crawled: self.pages,
            total_links_found: self.links,
            total_images_found: self.images,
            total_tables_found: self.tables,
            total_words_extracted: self.words,
            crawl_duration_seconds: round_seconds(self.started.elapsed().as_secs_f64()),
            total_forms_found: self.forms,
            start_url: self.meta.start_url.clone(),
            base_domain: self.meta.base_domain.clone(),
            max_depth: self.meta.max_depth,
            max_depth_reached: self.max_depth_reached,
            non_html_policy: self.meta.non_html_policy,
            completion,
            started_at: Some(self.started_at),
            finished_at: Some(Utc::now()),
        }
    }
}

/// Rounds to two decimal places
fn round_seconds(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}
