//! Watchlist-Notifier main entry point
//!
//! This is the command-line interface for the continue-watching notifier.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use watchlist_notifier::config::{load_config_with_hash, Config};
use watchlist_notifier::notify::build_notifier;
use watchlist_notifier::storage::open_catalog;
use watchlist_notifier::{ContinueScraper, SyncEngine, Worker};

/// Watchlist-Notifier: watches a "continue watching" page for new episodes
///
/// Periodically scrapes the page, tracks titles in a SQLite catalog and
/// sends a notification when new series or new seasons show up.
#[derive(Parser, Debug)]
#[command(name = "watchlist-notifier")]
#[command(version = "1.0.0")]
#[command(about = "Continue-watching change notifier", long_about = None)]
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

    /// Run a single sync pass and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    once: bool,

    /// Validate and print the effective configuration
    #[arg(long, conflicts_with_all = ["once", "stats"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["once", "dry_run"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_sync(config, config_hash, cli.once).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("watchlist_notifier=info,warn"),
            1 => EnvFilter::new("watchlist_notifier=debug,info"),
            2 => EnvFilter::new("watchlist_notifier=trace,debug"),
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

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Watchlist-Notifier Dry Run ===\n");

    println!("Source:");
    println!("  Base URL: {}", config.source.base_url);
    println!("  Continue path: {}", config.source.continue_path);
    println!("  User id: {}", config.source.user_id);
    println!("  Password hash: <{} chars>", config.source.password_hash.len());
    println!("  Accept-Language: {}", config.source.accept_language);
    println!("  Timeout: {}s", config.source.timeout_secs);

    println!("\nMarkers:");
    println!("  New episode: {}", config.markers.new_episode.join(", "));
    println!("  More episodes: {}", config.markers.more_episodes.join(", "));
    println!("  Watched class: {}", config.markers.watched_class);

    println!("\nSync:");
    println!("  Interval: {} minutes", config.sync.interval_minutes);
    println!("  Track progression: {}", config.sync.track_progression);
    println!(
        "  Detail retries: {} ({}ms apart)",
        config.sync.detail_retries, config.sync.detail_retry_delay_ms
    );
    println!("  Max pass retries: {}", config.sync.max_pass_retries);

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);

    println!("\nNotify:");
    match &config.notify.outbox_path {
        Some(path) => println!("  Outbox: {}", path),
        None => println!("  Log only"),
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use watchlist_notifier::output::{load_statistics, print_statistics};

    println!("Database: {}\n", config.storage.database_path);

    let store = open_catalog(Path::new(&config.storage.database_path))?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the sync modes: one pass with --once, the worker loop otherwise
async fn handle_sync(
    config: Config,
    config_hash: String,
    once: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_catalog(Path::new(&config.storage.database_path))?;
    let source = Arc::new(ContinueScraper::new(&config)?);
    let notifier = build_notifier(&config.notify);

    let mut engine = SyncEngine::new(store, source, notifier, config.sync.clone(), config_hash);

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, finishing up");
            signal_token.cancel();
        }
    });

    if once {
        let outcome = engine.sync_once(&cancel).await?;
        println!(
            "New series: {}, new seasons: {}, skipped: {}",
            outcome.new_series.len(),
            outcome.new_seasons.len(),
            outcome.skipped_items
        );
        return Ok(());
    }

    tracing::info!(
        "Starting worker, syncing every {} minutes",
        config.sync.interval_minutes
    );

    let mut worker = Worker::new(engine, &config.sync);
    match worker.run(&cancel).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!("Worker stopped: {}", e);
            Err(e.into())
        }
    }
}
