//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: lifecycle of one crawl (idle, running, completed, failed)
//! - `PageState`: outcome of each frontier entry (processed, dead link, timeout, etc.)

mod crawl_state;
mod page_state;

// Re-export main types
pub use crawl_state::CrawlState;
pub use page_state::PageState;
