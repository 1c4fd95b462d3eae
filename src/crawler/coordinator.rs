//! Crawl coordinator
//!
//! The coordinator task is the single owner of the frontier, the aggregator
//! and the report builder. Workers only fetch and extract; their results are
//! applied here, one level at a time and in frontier order.

use crate::config::{validate, Config, NonHtmlPolicy, MAX_ALLOWED_DEPTH};
use crate::crawler::extractor::{extract_page, ExtractOptions};
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::frontier::{Frontier, FrontierEntry, FrontierPolicy};
use crate::report::{Aggregator, CrawlCompletion, CrawlMeta, CrawlReport, PageRecord, ReportBuilder};
use crate::state::{CrawlState, PageState};
use crate::url::{extract_domain, normalize_url};
use crate::{CrawlError, UrlError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A request to crawl one site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRequest {
    /// Seed URL
    pub url: String,

    /// Link hops to follow from the seed; the configured default when absent
    #[serde(default)]
    pub max_depth: Option<u32>,
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_depth: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

/// Result of a crawl that produced a report
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub report: CrawlReport,

    /// Host of the seed URL
    pub domain: String,

    /// Count of frontier entries by terminal state
    pub page_states: BTreeMap<PageState, usize>,
}

/// A page a worker fetched and extracted
struct FetchedRecord {
    record: PageRecord,
    /// URL links on the page resolve against, after redirects
    base: Url,
    state: PageState,
}

type TaskOutput = (FrontierEntry, Result<FetchedRecord, FetchError>);

/// Everything one level produced
struct LevelResult {
    /// Finished fetches, in frontier order
    outcomes: Vec<TaskOutput>,
    /// Entries never dispatched
    unfetched: usize,
    /// Worker tasks that panicked
    panicked: usize,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    fetcher: Fetcher,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlError)` - Invalid configuration or HTTP client failure
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        validate(&config)?;
        let fetcher = Fetcher::from_config(&config.user_agent, &config.crawler)?;

        Ok(Self {
            config,
            fetcher,
            cancel: CancellationToken::new(),
        })
    }

    /// Token that cancels every crawl run by this coordinator
    ///
    /// Cancelling stops new fetches from being dispatched. Fetches already in
    /// flight finish under their own timeout and a partial report is built.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs one crawl to completion
    ///
    /// # Crawl Flow
    ///
    /// 1. Validate the requested depth and normalize the seed
    /// 2. Seed the frontier at depth 0
    /// 3. For each depth level:
    ///    a. Dispatch entries in frontier order, bounded by the worker pool
    ///       and the remaining page budget
    ///    b. Apply results in frontier order: drop pages redirected out of
    ///       scope or onto a visited URL, then aggregate, record, enqueue links
    /// 4. Finalize the report
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - Report of every page that was crawled
    /// * `Err(CrawlError)` - The seed was invalid or produced no page, or the
    ///   crawl was cancelled before any page was recorded
    pub async fn run(&self, request: CrawlRequest) -> Result<CrawlOutcome, CrawlError> {
        let mut state = CrawlState::Idle;

        let (seed, max_depth) = match self.prepare(&request) {
            Ok(prepared) => prepared,
            Err(e) => {
                state.transition(CrawlState::Failed)?;
                tracing::error!("Crawl of {} rejected: {}", request.url, e);
                return Err(e);
            }
        };
        let domain = extract_domain(&seed).unwrap_or_default();

        state.transition(CrawlState::Running)?;
        tracing::info!(
            "Starting crawl of {} (max depth {}, scope {}, concurrency {})",
            seed,
            max_depth,
            self.config.crawler.scope.as_str(),
            self.config.crawler.concurrency
        );

        let cancel = self.cancel.child_token();
        let deadline = self.spawn_deadline(&cancel);
        let result = self.crawl(&seed, &domain, max_depth, &cancel).await;
        if let Some(handle) = deadline {
            handle.abort();
        }

        match result {
            Ok((report, page_states)) => {
                state.transition(CrawlState::Completed)?;
                tracing::info!(
                    "Crawl completed: {} pages in {:.2}s ({:?})",
                    report.crawl_summary.total_pages_crawled,
                    report.crawl_summary.crawl_duration_seconds,
                    report.crawl_summary.completion
                );
                Ok(CrawlOutcome {
                    report,
                    domain,
                    page_states,
                })
            }
            Err(e) => {
                state.transition(CrawlState::Failed)?;
                tracing::error!("Crawl of {} failed: {}", seed, e);
                Err(e)
            }
        }
    }

    fn prepare(&self, request: &CrawlRequest) -> Result<(Url, u32), CrawlError> {
        let max_depth = request.max_depth.unwrap_or(self.config.crawler.max_depth);
        if max_depth > MAX_ALLOWED_DEPTH {
            return Err(CrawlError::InvalidRequest(format!(
                "max_depth must be between 0 and {}, got {}",
                MAX_ALLOWED_DEPTH, max_depth
            )));
        }

        let seed = normalize_url(&request.url).map_err(|source| CrawlError::InvalidSeedUrl {
            url: request.url.clone(),
            source,
        })?;
        if extract_domain(&seed).map_or(true, |d| d.is_empty()) {
            return Err(CrawlError::InvalidSeedUrl {
                url: request.url.clone(),
                source: UrlError::MissingDomain,
            });
        }
        Ok((seed, max_depth))
    }

    /// Cancels `cancel` once the crawl deadline passes, if one is configured
    fn spawn_deadline(&self, cancel: &CancellationToken) -> Option<tokio::task::JoinHandle<()>> {
        let secs = self.config.crawler.crawl_timeout_secs;
        if secs == 0 {
            return None;
        }
        let cancel = cancel.clone();
        Some(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            tracing::warn!("Crawl deadline of {}s reached, stopping", secs);
            cancel.cancel();
        }))
    }

    async fn crawl(
        &self,
        seed: &Url,
        domain: &str,
        max_depth: u32,
        cancel: &CancellationToken,
    ) -> Result<(CrawlReport, BTreeMap<PageState, usize>), CrawlError> {
        let crawler = &self.config.crawler;
        let mut frontier = Frontier::new(seed, max_depth, FrontierPolicy::from_config(crawler));
        frontier.seed();

        let mut aggregator = Aggregator::new(CrawlMeta {
            start_url: seed.to_string(),
            base_domain: domain.to_string(),
            max_depth,
            non_html_policy: crawler.non_html,
        });
        let mut builder = ReportBuilder::new();
        let mut page_states: BTreeMap<PageState, usize> = BTreeMap::new();
        let semaphore = Arc::new(Semaphore::new(crawler.concurrency));
        let started = Instant::now();

        let mut completion = CrawlCompletion::Exhausted;
        let mut seed_error = None;

        while !frontier.is_empty() {
            if cancel.is_cancelled() {
                completion = CrawlCompletion::Cancelled;
                break;
            }
            let remaining = crawler.max_total_pages.saturating_sub(builder.len());
            if remaining == 0 {
                let dropped = frontier.clear();
                *page_states.entry(PageState::PageLimitHit).or_default() += dropped;
                tracing::info!(
                    "Page cap of {} reached, {} queued pages dropped",
                    crawler.max_total_pages,
                    dropped
                );
                completion = CrawlCompletion::PageLimit;
                break;
            }

            let level = frontier.drain_level();
            let depth = level.first().map(|entry| entry.depth).unwrap_or_default();
            tracing::debug!(
                "Crawling depth {}: {} pages, budget {}",
                depth,
                level.len(),
                remaining
            );

            let result = self.run_level(level, remaining, &semaphore, cancel).await;
            *page_states.entry(PageState::Failed).or_default() += result.panicked;
            if result.unfetched > 0 {
                if cancel.is_cancelled() {
                    completion = CrawlCompletion::Cancelled;
                } else {
                    *page_states.entry(PageState::PageLimitHit).or_default() += result.unfetched;
                    completion = CrawlCompletion::PageLimit;
                }
            }

            for (entry, outcome) in result.outcomes {
                let fetched = match outcome {
                    Ok(fetched) => fetched,
                    Err(e) => {
                        tracing::debug!("Skipping {}: {}", entry.url, e);
                        *page_states.entry(e.page_state()).or_default() += 1;
                        if entry.depth == 0 {
                            seed_error = Some(e);
                        }
                        continue;
                    }
                };

                let admitted = frontier.admit_redirect(&entry, &fetched.base);
                if !admitted.is_accepted() {
                    tracing::debug!(
                        "Dropping {}: redirected to {} ({:?})",
                        entry.url,
                        fetched.base,
                        admitted
                    );
                    *page_states.entry(PageState::Redirected).or_default() += 1;
                    continue;
                }

                if builder.len() >= crawler.max_total_pages {
                    *page_states.entry(PageState::PageLimitHit).or_default() += 1;
                    completion = CrawlCompletion::PageLimit;
                    continue;
                }

                *page_states.entry(fetched.state).or_default() += 1;
                aggregator.record(&fetched.record, entry.depth);
                if entry.depth < max_depth {
                    self.enqueue_links(&mut frontier, &fetched, entry.depth);
                }
                builder.push(entry.depth, fetched.record);

                let pages = builder.len();
                if pages % 10 == 0 {
                    tracing::info!(
                        "Progress: {} pages crawled, {} in frontier, {:.2} pages/sec",
                        pages,
                        frontier.len(),
                        pages as f64 / started.elapsed().as_secs_f64().max(f64::EPSILON)
                    );
                }
            }

            if completion != CrawlCompletion::Exhausted {
                break;
            }
        }

        if builder.is_empty() {
            return Err(match seed_error {
                Some(source) => CrawlError::SeedUnreachable {
                    url: seed.to_string(),
                    source,
                },
                None => CrawlError::Cancelled,
            });
        }

        let summary = aggregator.finish(completion);
        Ok((builder.finalize(summary), page_states))
    }

    /// Fetches one level's entries on the worker pool
    ///
    /// Entries are dispatched in frontier order. Dispatch stops while the
    /// pages already extracted plus those in flight would fill `budget`, and
    /// for good once `cancel` fires.
    async fn run_level(
        &self,
        level: Vec<FrontierEntry>,
        budget: usize,
        semaphore: &Arc<Semaphore>,
        cancel: &CancellationToken,
    ) -> LevelResult {
        let mut pending: VecDeque<FrontierEntry> = level.into();
        let mut tasks: JoinSet<TaskOutput> = JoinSet::new();
        let mut outcomes = Vec::with_capacity(pending.len());
        let mut extracted = 0;
        let mut panicked = 0;

        let options = ExtractOptions::from_config(&self.config.crawler);
        let non_html = self.config.crawler.non_html;

        loop {
            while !cancel.is_cancelled() && extracted + tasks.len() < budget {
                let Ok(permit) = semaphore.clone().try_acquire_owned() else {
                    break;
                };
                let Some(entry) = pending.pop_front() else {
                    break;
                };
                let fetcher = self.fetcher.clone();
                tasks.spawn(async move {
                    let _permit = permit;
                    tracing::trace!("{} {}", PageState::Fetching, entry.url);
                    let outcome = fetch_and_extract(&fetcher, &entry, &options, non_html).await;
                    (entry, outcome)
                });
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };
            match joined {
                Ok((entry, outcome)) => {
                    if outcome.is_ok() {
                        extracted += 1;
                    }
                    outcomes.push((entry, outcome));
                }
                Err(e) => {
                    tracing::error!("Fetch task failed: {}", e);
                    panicked += 1;
                }
            }
        }

        outcomes.sort_by_key(|(entry, _)| entry.seq);
        LevelResult {
            outcomes,
            unfetched: pending.len(),
            panicked,
        }
    }

    /// Offers a page's links to the frontier, up to the per-page limit
    fn enqueue_links(&self, frontier: &mut Frontier, fetched: &FetchedRecord, depth: u32) {
        let limit = self.config.crawler.max_links_per_page;
        let mut accepted = 0;
        for link in &fetched.record.links {
            if limit > 0 && accepted >= limit {
                break;
            }
            if frontier.enqueue_if_eligible(&link.url, depth, &fetched.base) {
                accepted += 1;
            }
        }
        tracing::trace!("Enqueued {} links from {}", accepted, fetched.record.url);
    }
}

/// Fetches one entry and extracts its record
///
/// The record carries the entry's normalized URL; links resolve against
/// the final URL after redirects.
async fn fetch_and_extract(
    fetcher: &Fetcher,
    entry: &FrontierEntry,
    options: &ExtractOptions,
    non_html: NonHtmlPolicy,
) -> Result<FetchedRecord, FetchError> {
    match fetcher.fetch(&entry.url).await {
        Ok(page) => {
            let mut record = extract_page(&page.body, &page.final_url, options);
            record.url = entry.url.to_string();
            Ok(FetchedRecord {
                record,
                base: page.final_url,
                state: PageState::Processed,
            })
        }
        Err(FetchError::UnsupportedContentType { content_type, .. })
            if non_html == NonHtmlPolicy::RecordEmpty =>
        {
            tracing::debug!("Recording {} ({}) with no content", entry.url, content_type);
            Ok(FetchedRecord {
                record: PageRecord::empty(entry.url.as_str()),
                base: entry.url.clone(),
                state: PageState::RecordedEmpty,
            })
        }
        Err(e) => Err(e),
    }
}

/// Runs a single crawl with a fresh coordinator
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `request` - Seed URL and depth
///
/// # Example
///
/// ```no_run
/// use deep_crawl::{run_crawl, Config, CrawlRequest};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let request = CrawlRequest::new("https://example.com").with_max_depth(1);
/// let outcome = run_crawl(Config::default(), request).await?;
/// println!("{} pages", outcome.report.crawl_summary.total_pages_crawled);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, request: CrawlRequest) -> Result<CrawlOutcome, CrawlError> {
    Coordinator::new(config)?.run(request).await
}
