//! Star-Harvest main entry point
//!
//! This is the command-line interface for the Star-Harvest repository
//! crawler.

use clap::Parser;
use star_harvest::config::{github_token, load_config_with_hash};
use star_harvest::crawler::crawl;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Star-Harvest: a GitHub repository star crawler
///
/// Star-Harvest walks the GitHub GraphQL search API under its rate-limit
/// quota and stores repository records plus a star-count time series in
/// SQLite.
#[derive(Parser, Debug)]
#[command(name = "star-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A GitHub repository star crawler", long_about = None)]
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

    /// Override the configured total target
    #[arg(long, value_name = "COUNT")]
    target: Option<u64>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(target) = cli.target {
        config.crawl.total_target = target;
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("star_harvest=info,warn"),
            1 => EnvFilter::new("star_harvest=debug,info"),
            2 => EnvFilter::new("star_harvest=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &star_harvest::config::Config) {
    println!("=== Star-Harvest Dry Run ===\n");

    println!("Crawl Configuration:");
    println!("  Total target: {}", config.crawl.total_target);
    println!("  Batch size: {}", config.crawl.batch_size);
    println!("  Page size: {}", config.crawl.page_size);
    println!("  Search query: {}", config.crawl.search_query);

    println!("\nAPI:");
    println!("  Endpoint: {}", config.api.endpoint);
    println!("  Max retries: {}", config.api.max_retries);
    println!("  Backoff base: {}s", config.api.backoff_base_secs);
    println!(
        "  Rate limit threshold: {}",
        config.api.rate_limit_threshold
    );
    println!("  Safety margin: {}s", config.api.safety_margin_secs);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} repositories matching '{}'",
        config.crawl.total_target, config.crawl.search_query
    );
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &star_harvest::config::Config) -> anyhow::Result<()> {
    use star_harvest::output::{load_statistics, print_statistics};
    use star_harvest::storage::SqliteStorage;
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    // Open the database
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    // Load statistics
    let stats = load_statistics(&storage)?;

    // Print statistics
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: star_harvest::config::Config,
    config_hash: &str,
) -> anyhow::Result<()> {
    // The credential is required before any network work starts
    let token = github_token()?;

    tracing::info!(
        "Crawling {} repositories matching '{}'",
        config.crawl.total_target,
        config.crawl.search_query
    );

    match crawl(config, &token, config_hash).await {
        Ok(total) => {
            println!("Successfully crawled {} repositories", total);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
