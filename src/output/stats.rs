//! Statistics about the persisted seen-link history
//!
//! This module backs the `--stats` mode: it inspects the state file without
//! fetching anything.

use crate::store::{SeenSet, StateFile, DELIMITER};
use crate::RelayError;
use std::path::PathBuf;

/// Snapshot of the state file
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Path of the state file
    pub path: PathBuf,

    /// Whether the file exists
    pub exists: bool,

    /// Size of the file in bytes
    pub bytes: u64,

    /// Raw token count (delimiters in the file)
    pub raw_tokens: usize,

    /// Fingerprints that survive parsing
    pub entries: usize,

    /// Configured capacity
    pub max_entries: usize,
}

impl StoreStatistics {
    /// Capacity used, as a percentage
    pub fn usage_percent(&self) -> f64 {
        if self.max_entries == 0 {
            return 0.0;
        }
        (self.entries as f64 / self.max_entries as f64) * 100.0
    }

    /// Whether the next run will discard the history
    pub fn will_reset(&self) -> bool {
        self.entries > self.max_entries
    }
}

/// Loads statistics for a state file
///
/// # Arguments
///
/// * `file` - The state file to inspect
/// * `max_entries` - The configured capacity
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully inspected the file
/// * `Err(RelayError)` - The file exists but could not be read
pub async fn load_statistics(
    file: &StateFile,
    max_entries: usize,
) -> Result<StoreStatistics, RelayError> {
    let raw = file.read_raw().await?;
    let (exists, bytes, raw_tokens, entries) = match raw {
        Some(raw) => (
            true,
            raw.len() as u64,
            raw.matches(DELIMITER).count(),
            SeenSet::load(&raw).len(),
        ),
        None => (false, 0, 0, 0),
    };

    Ok(StoreStatistics {
        path: file.path().to_path_buf(),
        exists,
        bytes,
        raw_tokens,
        entries,
        max_entries,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Seen-Link History ===\n");

    println!("State file: {}", stats.path.display());
    if !stats.exists {
        println!("  (not created yet)");
        return;
    }

    println!("  Size: {} bytes", stats.bytes);
    println!("  Raw tokens: {}", stats.raw_tokens);
    println!("  Fingerprints: {}", stats.entries);
    println!(
        "  Capacity: {} / {} ({:.1}%)",
        stats.entries,
        stats.max_entries,
        stats.usage_percent()
    );

    if stats.raw_tokens > 0 && stats.entries == 0 {
        println!("\nHistory holds no usable fingerprints and will be treated as empty.");
    } else if stats.will_reset() {
        println!("\nHistory exceeds capacity and will be reset on the next run.");
    }
}
