//! Seen-link store
//!
//! This module holds everything the relay remembers between runs:
//! - `Fingerprint`: the hash identifying a post URL
//! - `SeenSet`: the bounded set of fingerprints already forwarded
//! - `StateFile`: atomic persistence of that set as a comma-terminated text file

mod fingerprint;
mod seen_set;
mod state_file;

pub use fingerprint::Fingerprint;
pub use seen_set::{SeenSet, DELIMITER};
pub use state_file::StateFile;

/// Default fingerprint count above which the history is discarded
pub const DEFAULT_MAX_ENTRIES: usize = 260_000;
