//! Relay module: fetch, extract, deduplicate, deliver
//!
//! This module contains the run pipeline, including:
//! - HTTP fetching of the listing page with a bounded retry
//! - HTML parsing and subject link extraction
//! - The coordinator that ties the store, fetcher and notifier together

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::Relay;
pub use fetcher::{
    browser_headers, build_http_client, with_retry, FetchResult, HttpFetcher, PageSource,
    MAX_FETCH_ATTEMPTS,
};
pub use parser::{
    extract_links, extract_tagged_links, resolve_post_url, sanitize_title, CandidateLink,
    TypeFilter,
};

use crate::config::{resolve_token, Config};
use crate::notify::{LogNotifier, TelegramNotifier};
use crate::output::RunReport;
use crate::RelayError;

/// Runs one relay pass with the real HTTP fetcher
///
/// In dry-run mode messages are logged instead of sent, no token is needed,
/// and the history is not written back.
///
/// # Arguments
///
/// * `config` - The relay configuration
/// * `dry_run` - Log instead of delivering, and skip persistence
///
/// # Returns
///
/// * `Ok(RunReport)` - The run completed or was skipped
/// * `Err(RelayError)` - Missing token, or the state file could not be read or written
pub async fn run_relay(config: Config, dry_run: bool) -> Result<RunReport, RelayError> {
    let fetcher = HttpFetcher::new(config.source.clone())?;

    if dry_run {
        return Relay::new(config, fetcher, LogNotifier)
            .without_persistence()
            .run()
            .await;
    }

    let token = resolve_token(&config)?;
    let notifier = TelegramNotifier::new(&config.telegram, &token)?;
    Relay::new(config, fetcher, notifier).run().await
}
