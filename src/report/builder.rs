//! Final report assembly
//!
//! Pages are pushed in visitation order. `finalize` assigns each a stable
//! key, groups keys by depth, computes the derived views and makes sure the
//! summary totals agree with the pages actually in the report.

use crate::report::analysis::{content_analysis, site_structure};
use crate::report::page_map::PageMap;
use crate::report::types::{CrawlReport, CrawlSummary, PageRecord};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Hex digits of the URL hash used for a page key
pub const PAGE_KEY_LEN: usize = 12;

#[derive(Debug, Default)]
pub struct ReportBuilder {
    pages: Vec<(u32, PageRecord)>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an accepted page found at `depth`
    pub fn push(&mut self, depth: u32, record: PageRecord) {
        self.pages.push((depth, record));
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Consumes the builder and produces the report
    ///
    /// # Arguments
    ///
    /// * `summary` - Totals from the aggregator
    ///
    /// # Returns
    ///
    /// A report whose `detailed_pages` preserves push order. Summary totals
    /// are recomputed from the pages if they disagree.
    pub fn finalize(self, mut summary: CrawlSummary) -> CrawlReport {
        let mut detailed_pages = PageMap::new();
        let mut pages_by_depth: BTreeMap<u32, Vec<String>> = BTreeMap::new();

        for (depth, record) in self.pages {
            let key = unique_key(&detailed_pages, &record.url);
            pages_by_depth.entry(depth).or_default().push(key.clone());
            detailed_pages.insert(key, record);
        }

        reconcile(&mut summary, &detailed_pages);

        CrawlReport {
            site_structure: site_structure(&detailed_pages, &summary.base_domain),
            content_analysis: content_analysis(&detailed_pages),
            crawl_summary: summary,
            pages_by_depth,
            detailed_pages,
        }
    }
}

/// Key for `url`, widened past `PAGE_KEY_LEN` hex digits when a shorter
/// prefix is already taken
pub fn page_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))[..PAGE_KEY_LEN].to_string()
}

fn unique_key(existing: &PageMap, url: &str) -> String {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    for len in PAGE_KEY_LEN..=digest.len() {
        let candidate = &digest[..len];
        if !existing.contains_key(candidate) {
            return candidate.to_string();
        }
    }

    // Same URL pushed twice
    let mut suffix = 2;
    loop {
        let candidate = format!("{}-{}", digest, suffix);
        if !existing.contains_key(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn reconcile(summary: &mut CrawlSummary, pages: &PageMap) {
    let mut actual = CrawlSummary {
        total_pages_crawled: pages.len(),
        ..CrawlSummary::default()
    };
    for page in pages.values() {
        actual.total_links_found += page.links_found;
        actual.total_images_found += page.images_found;
        actual.total_tables_found += page.tables_found;
        actual.total_forms_found += page.forms_found;
        actual.total_words_extracted += page.text_content.total_word_count;
    }

    let consistent = summary.total_pages_crawled == actual.total_pages_crawled
        && summary.total_links_found == actual.total_links_found
        && summary.total_images_found == actual.total_images_found
        && summary.total_tables_found == actual.total_tables_found
        && summary.total_forms_found == actual.total_forms_found
        && summary.total_words_extracted == actual.total_words_extracted;

    if !consistent {
        tracing::warn!(
            "Summary totals disagree with report pages ({} vs {} pages), recomputing",
            summary.total_pages_crawled,
            actual.total_pages_crawled
        );
        summary.total_pages_crawled = actual.total_pages_crawled;
        summary.total_links_found = actual.total_links_found;
        summary.total_images_found = actual.total_images_found;
        summary.total_tables_found = actual.total_tables_found;
        summary.total_forms_found = actual.total_forms_found;
        summary.total_words_extracted = actual.total_words_extracted;
    }
}
