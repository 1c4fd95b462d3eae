//! Crawl frontier: the depth-tagged queue and visited set
//!
//! This module handles:
//! - Deciding whether a discovered link may be enqueued
//! - Marking URLs visited at enqueue time so no URL is queued twice
//! - Breadth-first ordering, one depth level at a time

use crate::config::CrawlerConfig;
use crate::url::{extract_domain, normalize_url, resolve_url, CrawlScope};
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL accepted into the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Normalized URL to fetch
    pub url: Url,

    /// Hops from the seed
    pub depth: u32,

    /// Acceptance order, unique within a crawl
    pub seq: u64,
}

/// Scoping rules applied to every discovered link
#[derive(Debug, Clone, Default)]
pub struct FrontierPolicy {
    pub scope: CrawlScope,

    /// Lowercase path extensions, without the dot, that are never enqueued
    pub skip_extensions: Vec<String>,
}

impl FrontierPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            scope: config.scope,
            skip_extensions: config
                .skip_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
        }
    }

    fn skips_extension(&self, url: &Url) -> bool {
        let Some(last) = url.path().rsplit('/').next() else {
            return false;
        };
        match last.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                let ext = ext.to_ascii_lowercase();
                self.skip_extensions.iter().any(|skip| *skip == ext)
            }
            _ => false,
        }
    }
}

/// Outcome of the eligibility check for a discovered link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// May be enqueued; carries the normalized URL
    Accepted(Url),
    /// Could not be resolved or is not HTTP(S)
    InvalidUrl,
    /// Would land deeper than the crawl's maximum depth
    DepthExceeded,
    /// Already in the visited set
    AlreadyVisited,
    /// Host not allowed by the crawl scope
    OutOfScope,
    /// Path ends in a skipped extension
    SkippedExtension,
}

impl Eligibility {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Frontier for one crawl
///
/// Every URL in the visited set has been, or is, in the queue exactly once.
/// Entries are popped in acceptance order, which is also depth order.
#[derive(Debug)]
pub struct Frontier {
    seed: Url,
    seed_host: String,
    max_depth: u32,
    policy: FrontierPolicy,
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
    next_seq: u64,
}

impl Frontier {
    /// Creates an empty frontier for a crawl seeded at `seed`
    ///
    /// `seed` must already be normalized. Call [`Frontier::seed`] to enqueue
    /// it.
    pub fn new(seed: &Url, max_depth: u32, policy: FrontierPolicy) -> Self {
        Self {
            seed: seed.clone(),
            seed_host: extract_domain(seed).unwrap_or_default(),
            max_depth,
            policy,
            queue: VecDeque::new(),
            visited: HashSet::new(),
            next_seq: 0,
        }
    }

    /// Enqueues the seed at depth 0
    ///
    /// Returns false if the seed was already enqueued.
    pub fn seed(&mut self) -> bool {
        let seed = self.seed.clone();
        if self.visited.contains(seed.as_str()) {
            return false;
        }
        self.accept(seed, 0);
        true
    }

    /// Evaluates a discovered link without changing the frontier
    ///
    /// # Eligibility Order
    ///
    /// 1. Resolve and normalize against `base`
    /// 2. Reject if `from_depth + 1` exceeds the maximum depth
    /// 3. Reject if already visited
    /// 4. Reject if the host is outside the crawl scope
    /// 5. Reject if the path ends in a skipped extension
    pub fn check(&self, candidate: &str, from_depth: u32, base: &Url) -> Eligibility {
        let Ok(url) = resolve_url(candidate, base) else {
            return Eligibility::InvalidUrl;
        };
        if from_depth.saturating_add(1) > self.max_depth {
            return Eligibility::DepthExceeded;
        }
        if self.visited.contains(url.as_str()) {
            return Eligibility::AlreadyVisited;
        }
        let domain = extract_domain(&url).unwrap_or_default();
        if !self.policy.scope.allows(&self.seed_host, &domain) {
            return Eligibility::OutOfScope;
        }
        if self.policy.skips_extension(&url) {
            return Eligibility::SkippedExtension;
        }
        Eligibility::Accepted(url)
    }

    /// Enqueues `candidate` at `from_depth + 1` if it is eligible
    ///
    /// # Returns
    ///
    /// * `true` - The link was accepted and marked visited
    /// * `false` - The link was rejected
    pub fn enqueue_if_eligible(&mut self, candidate: &str, from_depth: u32, base: &Url) -> bool {
        match self.check(candidate, from_depth, base) {
            Eligibility::Accepted(url) => {
                self.accept(url, from_depth + 1);
                true
            }
            rejected => {
                tracing::trace!("Not enqueuing {}: {:?}", candidate, rejected);
                false
            }
        }
    }

    /// Admits the URL `entry` was redirected to
    ///
    /// A target that normalizes to the entry's own URL is accepted as is.
    /// Any other target must be in scope and not yet visited; it is then
    /// marked visited without being queued. The seed is exempt from scoping.
    pub fn admit_redirect(&mut self, entry: &FrontierEntry, target: &Url) -> Eligibility {
        let Ok(url) = normalize_url(target.as_str()) else {
            return Eligibility::InvalidUrl;
        };
        if url == entry.url {
            return Eligibility::Accepted(url);
        }
        if self.visited.contains(url.as_str()) {
            return Eligibility::AlreadyVisited;
        }
        let domain = extract_domain(&url).unwrap_or_default();
        if entry.depth > 0 && !self.policy.scope.allows(&self.seed_host, &domain) {
            return Eligibility::OutOfScope;
        }
        self.visited.insert(url.as_str().to_string());
        Eligibility::Accepted(url)
    }

    fn accept(&mut self, url: Url, depth: u32) {
        self.visited.insert(url.as_str().to_string());
        self.queue.push_back(FrontierEntry {
            url,
            depth,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Removes and returns the next entry
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    /// Removes and returns every queued entry at the shallowest queued depth,
    /// in acceptance order
    pub fn drain_level(&mut self) -> Vec<FrontierEntry> {
        let Some(depth) = self.queue.front().map(|entry| entry.depth) else {
            return Vec::new();
        };
        let count = self
            .queue
            .iter()
            .take_while(|entry| entry.depth == depth)
            .count();
        self.queue.drain(..count).collect()
    }

    /// Drops every queued entry, returning how many were dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn seed_host(&self) -> &str {
        &self.seed_host
    }
}
