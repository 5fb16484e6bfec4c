//! Relay coordinator - one linear run from fetch to persisted history
//!
//! A run:
//! 1. Loads the seen-link history and applies the capacity check
//! 2. Fetches the listing page; a failed fetch ends the run untouched
//! 3. Extracts candidate links in document order
//! 4. Records each unseen link, then attempts delivery
//! 5. Persists the history

use crate::config::Config;
use crate::notify::{format_message, Notifier};
use crate::output::{RunOutcome, RunReport};
use crate::relay::fetcher::{FetchResult, PageSource};
use crate::relay::parser::{extract_links, extract_tagged_links, TypeFilter};
use crate::store::{Fingerprint, StateFile};
use crate::RelayError;

/// Main relay structure
///
/// The page source and notifier are injected so runs can be driven by fakes.
pub struct Relay<S, N> {
    config: Config,
    source: S,
    notifier: N,
    state: StateFile,
    persist: bool,
}

impl<S: PageSource, N: Notifier> Relay<S, N> {
    /// Creates a relay that persists its history to `config.store.path`
    pub fn new(config: Config, source: S, notifier: N) -> Self {
        let state = StateFile::new(&config.store.path);
        Self {
            config,
            source,
            notifier,
            state,
            persist: true,
        }
    }

    /// Disables writing the history back at the end of a run
    pub fn without_persistence(mut self) -> Self {
        self.persist = false;
        self
    }

    pub fn state_file(&self) -> &StateFile {
        &self.state
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Runs one poll of the listing page
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` - The run completed or was skipped because the page was unavailable
    /// * `Err(RelayError)` - The state file could not be read or written
    pub async fn run(&self) -> Result<RunReport, RelayError> {
        let mut report = RunReport::new();

        let loaded = self.state.read().await?;
        let max_entries = self.config.store.max_entries;
        report.store_reset = loaded.exceeds(max_entries);
        let mut seen = loaded.capacity_check(max_entries);
        tracing::debug!("Loaded {} fingerprints", seen.len());

        tracing::info!("Fetching {}", self.source.url());
        let page = self.source.fetch().await;
        let Some(body) = page.success_body() else {
            let reason = match &page {
                FetchResult::Page { status, .. } => format!("HTTP {}", status),
                FetchResult::Unavailable { error } => error.clone(),
            };
            return Ok(self.skip(report, reason));
        };

        let source = &self.config.source;
        let candidates = if source.type_filter.trim().is_empty() {
            extract_links(body, &source.base_url, &source.link_selector)?
        } else {
            let filter = TypeFilter {
                row_selector: &source.row_selector,
                tag_selector: &source.tag_selector,
                text: source.type_filter.trim(),
            };
            extract_tagged_links(body, &source.base_url, &source.link_selector, &filter)?
        };
        report.candidates = candidates.len();
        if candidates.is_empty() {
            tracing::warn!("No links matched '{}'", source.link_selector);
        }

        let chat_id = &self.config.telegram.chat_id;
        for link in &candidates {
            let fingerprint = Fingerprint::of(&link.url);
            if seen.contains(&fingerprint) {
                report.duplicates += 1;
                continue;
            }

            // Recorded before delivery: at most once
            seen.add(fingerprint);
            report.new_links += 1;

            let message = format_message(link);
            tracing::info!("New post: {} ({})", link.title, link.url);

            match self.notifier.send(chat_id, &message).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.delivery_failures += 1;
                    tracing::warn!("Failed to deliver {}: {}", link.url, e);
                }
            }
        }

        report.store_size = seen.len();
        if self.persist {
            self.state.write(&seen).await?;
            report.persisted = true;
        }

        let report = report.finish();
        tracing::info!("Run complete: {}", report);
        Ok(report)
    }

    fn skip(&self, mut report: RunReport, reason: String) -> RunReport {
        tracing::warn!(
            "Could not retrieve {}: {}; skipping run",
            self.source.url(),
            reason
        );
        report.outcome = RunOutcome::Skipped { reason };
        report.finish()
    }
}
