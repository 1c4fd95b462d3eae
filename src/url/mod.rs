//! URL handling module for Deep-Crawl
//!
//! This module provides URL normalization and resolution, domain extraction,
//! wildcard host matching, and the crawl scope policy.

mod domain;
mod normalize;
mod scope;

// Re-export main functions
pub use domain::{extract_domain, strip_port, strip_www};
pub use normalize::{normalize_url, resolve_url};
pub use scope::{matches_wildcard, CrawlScope};
