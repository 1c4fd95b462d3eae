//! Deep-Crawl main entry point
//!
//! This is the command-line interface for the Deep-Crawl site crawler.

use anyhow::Context;
use clap::Parser;
use deep_crawl::config::{load_config_with_hash, Config};
use deep_crawl::report::{print_statistics, write_report, CrawlStatistics};
use deep_crawl::{Coordinator, CrawlRequest, CrawlResponse};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Deep-Crawl: a bounded-depth website crawler
///
/// Deep-Crawl crawls a site breadth-first from a seed URL for up to three
/// link hops and writes a JSON report of every page it visited.
#[derive(Parser, Debug)]
#[command(name = "deep-crawl")]
#[command(version)]
#[command(about = "A bounded-depth website crawler", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// Link hops to follow from the seed (0-3)
    #[arg(short, long)]
    depth: Option<u32>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory the report is written to
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Number of concurrent fetches
    #[arg(long)]
    concurrency: Option<usize>,

    /// Print the JSON response to stdout instead of statistics
    #[arg(long)]
    json: bool,

    /// Do not write the report file
    #[arg(long)]
    no_save: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if let Some(dir) = &cli.output {
        config.output.report_dir = dir.display().to_string();
    }

    let mut request = CrawlRequest::new(cli.url.clone());
    request.max_depth = cli.depth;

    if cli.dry_run {
        deep_crawl::config::validate(&config).context("Invalid configuration")?;
        handle_dry_run(&config, &request);
        return Ok(());
    }

    if !handle_crawl(config, request, &cli).await? {
        std::process::exit(1);
    }
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("deep_crawl=info,warn"),
            1 => EnvFilter::new("deep_crawl=debug,info"),
            2 => EnvFilter::new("deep_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, request: &CrawlRequest) {
    let crawler = &config.crawler;
    println!("=== Deep-Crawl Dry Run ===\n");

    println!("Request:");
    println!("  Seed URL: {}", request.url);
    println!(
        "  Max depth: {}",
        request.max_depth.unwrap_or(crawler.max_depth)
    );

    println!("\nCrawler Configuration:");
    println!("  Max total pages: {}", crawler.max_total_pages);
    println!("  Max links per page: {}", crawler.max_links_per_page);
    println!("  Concurrency: {}", crawler.concurrency);
    println!("  Request timeout: {}s", crawler.request_timeout_secs);
    println!("  Crawl timeout: {}s", crawler.crawl_timeout_secs);
    println!("  Retries: {}", crawler.max_retries);
    println!("  Scope: {}", crawler.scope.as_str());
    println!("  Non-HTML pages: {}", crawler.non_html.as_str());
    println!("  Skipped extensions: {}", crawler.skip_extensions.join(", "));

    println!("\nUser Agent: {}", config.user_agent.header_value());
    println!("\nOutput:");
    println!("  Report directory: {}", config.output.report_dir);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
///
/// Returns false if the crawl failed.
async fn handle_crawl(config: Config, request: CrawlRequest, cli: &Cli) -> anyhow::Result<bool> {
    let report_dir = PathBuf::from(&config.output.report_dir);
    let pretty = config.output.pretty;

    let coordinator = Coordinator::new(config).context("Failed to start crawler")?;

    // Ctrl-C stops dispatching and keeps the partial report
    let cancel = coordinator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing in-flight pages");
            cancel.cancel();
        }
    });

    let result = coordinator.run(request).await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&CrawlResponse::failure(&e))?);
            }
            tracing::error!("Crawl failed: {}", e);
            return Ok(false);
        }
    };

    if !cli.no_save {
        let path = write_report(&outcome.report, &outcome.domain, &report_dir, pretty)
            .context("Failed to write report")?;
        if !cli.json && !cli.quiet {
            println!("Report saved to: {}\n", path.display());
        }
    }

    if cli.json {
        let response = CrawlResponse::success(outcome.report, outcome.domain);
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else if !cli.quiet {
        let stats = CrawlStatistics::from_states(&outcome.page_states);
        print_statistics(&outcome.report.crawl_summary, &stats);
    }

    Ok(true)
}
