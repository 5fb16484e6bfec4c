//! Per-run report
//!
//! Every run returns a [`RunReport`] and logs its summary line.

use chrono::{DateTime, Utc};
use std::fmt;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The page was fetched and processed; the history was persisted
    Completed,

    /// The page could not be retrieved; nothing was sent or written
    Skipped { reason: String },
}

impl RunOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Counters and timestamps for one run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcome: RunOutcome,

    /// Candidate links extracted from the page
    pub candidates: usize,

    /// Candidates not present in the history
    pub new_links: usize,

    /// Candidates already present in the history
    pub duplicates: usize,

    /// Messages accepted by the notifier
    pub delivered: usize,

    /// Messages the notifier rejected (links still recorded as seen)
    pub delivery_failures: usize,

    /// History size at the end of the run
    pub store_size: usize,

    /// Whether the history was discarded for exceeding its capacity
    pub store_reset: bool,

    /// Whether the history was written back to disk
    pub persisted: bool,
}

impl RunReport {
    /// Creates an empty report stamped with the current time
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            outcome: RunOutcome::Completed,
            candidates: 0,
            new_links: 0,
            duplicates: 0,
            delivered: 0,
            delivery_failures: 0,
            store_size: 0,
            store_reset: false,
            persisted: false,
        }
    }

    /// Stamps the finish time
    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    /// Run duration in milliseconds, once finished
    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds())
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            RunOutcome::Skipped { reason } => write!(f, "run skipped: {}", reason),
            RunOutcome::Completed => {
                write!(
                    f,
                    "{} candidates, {} new, {} already seen, {} delivered, {} failed; history holds {}",
                    self.candidates,
                    self.new_links,
                    self.duplicates,
                    self.delivered,
                    self.delivery_failures,
                    self.store_size
                )?;
                if self.store_reset {
                    write!(f, " (reset this run)")?;
                }
                if !self.persisted {
                    write!(f, " (not persisted)")?;
                }
                Ok(())
            }
        }
    }
}
