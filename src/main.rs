//! Review Collector main entry point
//!
//! This is the command-line interface for the storefront review collector.

use anyhow::Context;
use chrono::{Duration as ChronoDuration, Utc};
use clap::Parser;
use review_collector::config::{load_config_with_hash, CollectorConfig, CollectorOptions};
use review_collector::output::{print_statistics, RunStatistics};
use review_collector::{Collector, SourceList};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Review Collector: an incremental storefront review harvester
///
/// Pages through the customer reviews of one or more storefront listings
/// and prints every review as it is found.
#[derive(Parser, Debug)]
#[command(name = "review-collector")]
#[command(version = "1.0.0")]
#[command(about = "An incremental storefront review harvester", long_about = None)]
struct Cli {
    /// Storefront listing identifiers to collect, in order
    #[arg(value_name = "SOURCE")]
    sources: Vec<String>,

    /// Path to a TOML configuration file (sources and [collector] options)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum pages per source, 0 for no limit
    #[arg(long)]
    max_pages: Option<u32>,

    /// Delay before every request, in milliseconds
    #[arg(long, value_name = "MS")]
    delay: Option<u64>,

    /// Failed attempts tolerated per page
    #[arg(long)]
    max_retries: Option<u32>,

    /// User agent sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Keep paging a source only while every review on the page is newer than this many days
    #[arg(long, value_name = "DAYS")]
    max_age_days: Option<i64>,

    /// Skip malformed reviews instead of failing their page
    #[arg(long)]
    skip_malformed: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration and show what would be collected without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (sources, mut options) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (file, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (file.sources, file.collector)
        }
        None => (Vec::new(), CollectorOptions::default()),
    };

    let sources = merge_sources(sources, &cli.sources);
    apply_overrides(&cli, &mut options);

    if cli.dry_run {
        return handle_dry_run(SourceList::from(sources), options);
    }

    handle_collect(SourceList::from(sources), options, cli.max_age_days).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("review_collector=info,warn"),
            1 => EnvFilter::new("review_collector=debug,info"),
            2 => EnvFilter::new("review_collector=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line sources are queued after the file's, skipping ones already listed
fn merge_sources(mut sources: Vec<String>, extra: &[String]) -> Vec<String> {
    for source in extra {
        if !sources.contains(source) {
            sources.push(source.clone());
        }
    }
    sources
}

/// Command-line options win over the file
fn apply_overrides(cli: &Cli, options: &mut CollectorOptions) {
    if let Some(max_pages) = cli.max_pages {
        options.max_pages = Some(max_pages);
    }
    if let Some(delay) = cli.delay {
        options.delay_ms = Some(delay);
    }
    if let Some(max_retries) = cli.max_retries {
        options.max_retries = Some(max_retries);
    }
    if let Some(user_agent) = &cli.user_agent {
        options.user_agent = Some(user_agent.clone());
    }
    if cli.max_age_days.is_some() {
        options.caller_driven = Some(true);
    }
    if cli.skip_malformed {
        options.skip_malformed = Some(true);
    }
}

/// Handles --dry-run: validates everything and shows what would be collected
fn handle_dry_run(sources: SourceList, options: CollectorOptions) -> anyhow::Result<()> {
    sources.validate()?;
    let config = CollectorConfig::from_options(options)?;

    println!("=== Review Collector Dry Run ===\n");

    println!("Collector Configuration:");
    println!("  Pagination: {:?}", config.pagination());
    println!("  Delay: {}ms", config.delay.as_millis());
    println!("  Max retries: {}", config.max_retries);
    println!("  Skip malformed reviews: {}", config.skip_malformed);
    println!("  User agent: {}", config.user_agent);

    println!("\nSources ({}):", sources.len());
    for source in sources.iter() {
        println!("  - {}", source);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main collection run
async fn handle_collect(
    sources: SourceList,
    options: CollectorOptions,
    max_age_days: Option<i64>,
) -> anyhow::Result<()> {
    let mut collector = Collector::new(sources, options)?;

    collector
        .on_record_found(|event| {
            println!(
                "{}\tpage {}\t{}★\tv{}\t{}\t{}",
                event.source_id,
                event.page,
                event.review.rating,
                event.review.version,
                event.review.date.format("%Y-%m-%d"),
                event.review.title.as_deref().unwrap_or("")
            );
        })
        .on_page_complete(|event| {
            tracing::info!(
                "Found {} reviews on page {} of {}",
                event.reviews.len(),
                event.page,
                event.source_id
            );
        })
        .on_source_done(|event| match &event.error {
            Some(error) => tracing::error!(
                "Finished collecting for {} due to error: {}, with {} sources to go",
                event.source_id,
                error,
                event.sources_remaining
            ),
            None => tracing::info!(
                "Finished collecting for {} after page {}, with {} sources to go",
                event.source_id,
                event.page,
                event.sources_remaining
            ),
        });

    if let Some(days) = max_age_days {
        let cutoff = Utc::now() - ChronoDuration::days(days);
        collector.on_page_complete(move |event| {
            if event.reviews.iter().any(|review| review.date < cutoff) {
                tracing::info!("Stop collecting reviews for {}", event.source_id);
                event.stop();
            } else {
                tracing::debug!("Keep collecting reviews for {}", event.source_id);
                event.proceed();
            }
        });
    }

    let started = Instant::now();
    let summary = collector.collect().await;

    let stats = RunStatistics::from_summary(&summary, started.elapsed());
    println!();
    print_statistics(&stats, &summary);

    Ok(())
}
