//! Bible-Sync main entry point
//!
//! This is the command-line interface that triggers one ingestion run.

use anyhow::Context;
use bible_sync::config::{load_config_with_hash, Config};
use bible_sync::output::{load_statistics, print_failure, print_report, print_statistics};
use bible_sync::{SourceKind, SyncEngine, SyncError};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Bible-Sync: scripture corpus ingestion
///
/// Crawls one scripture site and merges its languages, versions, books and
/// verses into a SQLite store. Re-running a sync updates rows in place.
#[derive(Parser, Debug)]
#[command(name = "bible-sync")]
#[command(version)]
#[command(about = "Scripture corpus ingestion", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Source to sync
    #[arg(value_enum, value_name = "SOURCE")]
    source: SourceKind,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be synced without fetching
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show row counts from the database and exit
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
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, cli.source);
    } else if cli.stats {
        handle_stats(config)?;
    } else {
        handle_sync(config, cli.source).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` wins over the flags when it is set.
fn setup_logging(verbose: u8, quiet: bool) {
    let default = if quiet {
        "error"
    } else {
        match verbose {
            0 => "bible_sync=info,warn",
            1 => "bible_sync=debug,info",
            _ => "bible_sync=trace,debug",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what a sync of `source` would do
fn handle_dry_run(config: &Config, source: SourceKind) {
    println!("=== Bible-Sync Dry Run ===\n");

    println!("Database: {}", config.database.path);
    println!(
        "Identifiers: node {} (min code length {})",
        config.identifiers.node_id, config.identifiers.min_length
    );
    println!(
        "HTTP: \"{}\" (timeout {}s, connect {}s)",
        config.http.user_agent, config.http.timeout_secs, config.http.connect_timeout_secs
    );
    println!(
        "Lock: stale after {}s\n",
        config.lock.stale_after_secs
    );

    match source {
        SourceKind::Gateway => {
            let gateway = &config.gateway;
            println!("Source: gateway");
            println!("  Base URL: {}", gateway.base_url);
            println!("  Language: {}", gateway.language_code);
            println!("  Versions: {}", gateway.versions.join(", "));
            println!("  Chapters per request: {}", gateway.chapters_per_request);
        }
        SourceKind::Toba => {
            let toba = &config.toba;
            println!("Source: toba");
            println!("  Base URL: {}", toba.base_url);
            println!("  Language: {} ({})", toba.language_name, toba.language_code);
            println!(
                "  Version: {} ({}, slug {})",
                toba.version_name, toba.version_code, toba.version_slug
            );
            println!(
                "  Testament fragments: OT \"{}\", NT \"{}\"",
                toba.old_testament_fragment, toba.new_testament_fragment
            );
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows row counts from the database
fn handle_stats(config: Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.database.path);

    let engine = SyncEngine::new(config)?;
    let store = engine.open_store().context("failed to open database")?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main sync operation, racing it against Ctrl-C
async fn handle_sync(config: Config, source: SourceKind) -> anyhow::Result<()> {
    let started = Instant::now();
    let engine = SyncEngine::new(config)?;

    tracing::info!(%source, "Starting sync");

    let result = tokio::select! {
        result = engine.run(source) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!(%source, "Interrupted, abandoning run before any write");
            Err(SyncError::Cancelled)
        }
    };

    match result {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            print_failure(source.as_str(), started.elapsed(), &e);
            Err(e).with_context(|| format!("sync of {} failed", source))
        }
    }
}
