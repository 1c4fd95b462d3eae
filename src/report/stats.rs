//! Per-page outcome statistics
//!
//! Built from the coordinator's tally of terminal page states and printed by
//! the CLI after a crawl.

use crate::report::types::CrawlSummary;
use crate::state::PageState;
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Frontier entries that reached a terminal state
    pub total_pages: usize,

    /// Count of pages by terminal state
    pub pages_by_state: BTreeMap<PageState, usize>,

    /// Count of pages in error states only
    pub error_summary: BTreeMap<PageState, usize>,
}

impl CrawlStatistics {
    pub fn from_states(states: &BTreeMap<PageState, usize>) -> Self {
        let pages_by_state: BTreeMap<PageState, usize> = states
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(state, count)| (*state, *count))
            .collect();
        let error_summary = pages_by_state
            .iter()
            .filter(|(state, _)| state.is_error())
            .map(|(state, count)| (*state, *count))
            .collect();

        Self {
            total_pages: pages_by_state.values().sum(),
            pages_by_state,
            error_summary,
        }
    }

    /// Pages that made it into the report
    pub fn successful(&self) -> usize {
        self.pages_by_state
            .iter()
            .filter(|(state, _)| state.is_success())
            .map(|(_, count)| count)
            .sum()
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        (self.successful() as f64 / self.total_pages as f64) * 100.0
    }
}

/// Prints the summary and statistics to stdout in a formatted manner
pub fn print_statistics(summary: &CrawlSummary, stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Start URL: {}", summary.start_url);
    println!("  Pages crawled: {}", summary.total_pages_crawled);
    println!(
        "  Depth reached: {} of {}",
        summary.max_depth_reached, summary.max_depth
    );
    println!("  Links found: {}", summary.total_links_found);
    println!("  Images found: {}", summary.total_images_found);
    println!("  Tables found: {}", summary.total_tables_found);
    println!("  Words extracted: {}", summary.total_words_extracted);
    println!("  Duration: {:.2}s", summary.crawl_duration_seconds);
    println!();

    println!("Pages by State:");
    let mut state_counts: Vec<_> = stats.pages_by_state.iter().collect();
    state_counts.sort_by(|a, b| b.1.cmp(a.1));

    for (state, count) in state_counts {
        let percentage = (*count as f64 / stats.total_pages.max(1) as f64) * 100.0;
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    if !stats.error_summary.is_empty() {
        println!("Error Summary:");
        for (state, count) in &stats.error_summary {
            println!("  {}: {}", state, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully processed)",
        stats.success_rate(),
        stats.successful(),
        stats.total_pages
    );
}
