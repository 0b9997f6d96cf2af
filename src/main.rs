//! Folio-Fetch main entry point
//!
//! Command-line interface for the book catalog scraper.

use anyhow::Context;
use clap::Parser;
use folio_fetch::cache::CacheDb;
use folio_fetch::config::load_config_with_hash;
use folio_fetch::crawler::crawl;
use folio_fetch::output::{load_statistics, print_statistics, write_export};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Folio-Fetch: a resumable book catalog scraper
///
/// Crawls paginated book catalog listings, extracting title, author, and
/// edition language for every book. Raw pages and extracted records are
/// cached durably, so interrupted or repeated runs only fetch what is new.
#[derive(Parser, Debug)]
#[command(name = "folio-fetch")]
#[command(version)]
#[command(about = "A resumable book catalog scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Extra listing entry points, crawled after the config's catalog
    #[arg(long, value_name = "URL")]
    links: Vec<String>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show cache statistics and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    let mut entry_points = config.entry_points();
    entry_points.extend(cli.links.iter().cloned());

    if cli.dry_run {
        handle_dry_run(&config, &entry_points);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config, &entry_points).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("folio_fetch=info,warn"),
            1 => EnvFilter::new("folio_fetch=debug,info"),
            2 => EnvFilter::new("folio_fetch=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &folio_fetch::Config, entry_points: &[String]) {
    println!("=== Folio-Fetch Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max fetch attempts: {}", config.crawler.max_fetch_attempts);
    println!("  Retry backoff: {}ms", config.crawler.retry_backoff_ms);
    println!("  Page settle: {}ms", config.crawler.page_settle_ms);
    println!(
        "  Pagination settle: {}ms",
        config.crawler.pagination_settle_ms
    );
    println!(
        "  Max concurrent walkers: {}",
        config.crawler.max_concurrent_walkers
    );
    if config.crawler.max_retry_time_ms > 0 {
        println!("  Retry time cap: {}ms", config.crawler.max_retry_time_ms);
    }

    println!("\nOutput:");
    println!("  Cache database: {}", config.output.cache_db_path);
    println!("  Export: {}", config.output.export_path);

    println!("\nCatalogs ({}):", config.catalog.len());
    for entry in &config.catalog {
        println!("  - {} ({} entry points)", entry.name, entry.links.len());
        for link in &entry.links {
            println!("    * {}", link);
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} entry points", entry_points.len());
}

/// Handles the --stats mode: shows cache statistics
fn handle_stats(config: &folio_fetch::Config) -> anyhow::Result<()> {
    println!("Cache database: {}\n", config.output.cache_db_path);

    let db = CacheDb::open(Path::new(&config.output.cache_db_path))?;
    let stats = load_statistics(&db)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &folio_fetch::Config, entry_points: &[String]) -> anyhow::Result<()> {
    if entry_points.is_empty() {
        anyhow::bail!("no entry points: configure a [[catalog]] or pass --links");
    }

    tracing::info!("Crawling {} entry points", entry_points.len());

    let records = crawl(config, entry_points).await?;
    tracing::info!("Crawl finished with {} records", records.len());

    write_export(&records, Path::new(&config.output.export_path))?;
    println!(
        "✓ {} records exported to {}",
        records.len(),
        config.output.export_path
    );

    Ok(())
}
