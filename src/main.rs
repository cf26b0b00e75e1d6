//! Tag-Harvester main entry point
//!
//! This is the command-line interface for the Tag-Harvester crawler.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tag_harvester::config::{apply_env_overrides, load_config_with_hash, Config};
use tag_harvester::output::{export_json, load_statistics, print_run_summary, print_statistics};
use tag_harvester::storage::open_storage;
use tag_harvester::{logging, CheckpointStore, Harvester};

/// Tag-Harvester: a resumable block-explorer tag crawler
///
/// Walks the explorer's tag cloud, extracts every tagged address from the
/// paginated listings and upserts it into a SQLite database. Pending tags are
/// kept in a checkpoint file so an interrupted run picks up where it stopped.
#[derive(Parser, Debug)]
#[command(name = "tag-harvester")]
#[command(version)]
#[command(about = "A resumable block-explorer tag crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Discard the checkpoint and rediscover tags before harvesting
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "export_json"])]
    fresh: bool,

    /// Validate config and show the pending tags without harvesting
    #[arg(long, conflicts_with_all = ["stats", "export_json"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_json"])]
    stats: bool,

    /// Export stored addresses as JSON to PATH and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["dry_run", "stats"])]
    export_json: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env file is fine; anything else is reported once logging is up
    let dotenv = dotenvy::dotenv();

    let (config, config_hash) = load_effective_config(cli.config.as_deref())?;

    let _log_guard = logging::init_logging(&config.logging, cli.verbose, cli.quiet)
        .context("Failed to initialize logging")?;

    match dotenv {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }

    match (&cli.config, &config_hash) {
        (Some(path), Some(hash)) => {
            tracing::info!("Configuration loaded from {} (hash: {})", path.display(), hash)
        }
        _ => tracing::info!("No configuration file given, using defaults"),
    }

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else if let Some(path) = &cli.export_json {
        handle_export_json(&config, path)
    } else {
        handle_harvest(config, cli.fresh, cli.quiet).await
    }
}

/// Loads the config file (or defaults) and layers the environment on top
fn load_effective_config(path: Option<&Path>) -> Result<(Config, Option<String>)> {
    let (mut config, hash) = match path {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())
        .context("Invalid environment override")?;

    Ok((config, hash))
}

/// Handles the --dry-run mode: validates config and shows the pending work
fn handle_dry_run(config: &Config) -> Result<()> {
    println!("=== Tag-Harvester Dry Run ===\n");

    println!("Source:");
    println!("  Base URL: {}", config.source.base_url);
    println!("  Provenance: {}", config.source.provenance);

    println!("\nNavigator:");
    println!("  Headless: {}", config.navigator.headless);
    println!("  User agent: {}", config.navigator.user_agent);
    println!("  Render timeout: {}ms", config.navigator.render_timeout_ms);
    println!("  Page delay: {}ms", config.navigator.page_delay_ms);

    println!("\nSelectors:");
    for (key, selector) in config.selectors.entries() {
        println!("  {}: {}", key, selector);
    }
    println!("  next-label: {}", config.selectors.next_label);

    println!("\nStorage:");
    println!("  Database: {}", config.database.name);
    println!("  Checkpoint: {}", config.checkpoint.path);
    println!(
        "  Log file: {}",
        logging::log_file_path(&config.logging).display()
    );

    let checkpoint = CheckpointStore::new(
        config.checkpoint.path.clone(),
        tracing::info_span!("checkpoint"),
    );
    let pending = checkpoint.load()?;

    println!("\n✓ Configuration is valid");
    if pending.is_empty() {
        println!("✓ No pending tags; a run would start by reading the tag cloud");
    } else {
        println!("✓ Would resume with {} pending tags:", pending.len());
        for tag in &pending {
            println!("  - {}", tag);
        }
    }

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<()> {
    println!("Database: {}\n", config.database.name);

    let store = open_storage(config)?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-json mode
fn handle_export_json(config: &Config, path: &Path) -> Result<()> {
    let store = open_storage(config)?;
    let count = export_json(&store, path)
        .with_context(|| format!("Failed to export to {}", path.display()))?;

    println!("✓ Exported {} addresses to: {}", count, path.display());
    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, fresh: bool, quiet: bool) -> Result<()> {
    let mut harvester = Harvester::from_config(config)?.fresh(fresh);

    match harvester.run().await {
        Ok(summary) => {
            if !quiet {
                print_run_summary(&summary);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
