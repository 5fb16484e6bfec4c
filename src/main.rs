//! Forum-Relay main entry point
//!
//! This is the command-line interface for the Forum-Relay poller. Each
//! invocation performs a single run; schedule it externally (cron, systemd
//! timer, CI schedule) and never let two runs overlap on one state file.

use anyhow::Context;
use clap::Parser;
use forum_relay::config::{load_config_with_hash, Config};
use forum_relay::output::{load_statistics, print_statistics};
use forum_relay::relay::run_relay;
use forum_relay::store::StateFile;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Forum-Relay: forwards new forum posts to a Telegram channel
///
/// Forum-Relay fetches a forum listing page, picks out post links it has not
/// seen before, and sends each one to a Telegram channel. The delivery token
/// is read from the environment variable named in the config
/// (TELEGRAM_BOT_TOKEN by default); a `.env` file is honoured.
#[derive(Parser, Debug)]
#[command(name = "forum-relay")]
#[command(version = "1.0.0")]
#[command(about = "Forwards new forum posts to a Telegram channel", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Fetch and deduplicate, but log messages instead of sending and keep the history unchanged
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics about the seen-link history and exit
    #[arg(long)]
    stats: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // A missing .env is the normal case in production
    dotenvy::dotenv().ok();

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    if cli.stats {
        handle_stats(&config).await
    } else {
        handle_run(config, cli.dry_run).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("forum_relay=info,warn"),
            1 => EnvFilter::new("forum_relay=debug,info"),
            2 => EnvFilter::new("forum_relay=trace,debug"),
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

/// Handles the --stats mode: inspects the state file
async fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let file = StateFile::new(&config.store.path);
    let stats = load_statistics(&file, config.store.max_entries)
        .await
        .with_context(|| format!("Failed to read {}", file.path().display()))?;

    print_statistics(&stats);
    Ok(())
}

/// Handles a normal (or dry) run
async fn handle_run(config: Config, dry_run: bool) -> anyhow::Result<()> {
    if dry_run {
        tracing::info!("Dry run: nothing will be sent or persisted");
    }

    tracing::info!(
        "Polling {} for '{}' links, forwarding to {}",
        config.source.listing_url,
        config.source.link_selector,
        config.telegram.chat_id
    );

    match run_relay(config, dry_run).await {
        Ok(report) => {
            if report.outcome.is_skipped() {
                tracing::info!("Nothing to do this time");
            }
            if let Some(ms) = report.duration_ms() {
                tracing::debug!("Run took {} ms", ms);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}
