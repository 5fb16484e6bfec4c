//! In-memory seen-link history
//!
//! The history is persisted as a single comma-terminated string of
//! fingerprints. In memory it is a set keyed by exact token, so one digest
//! being a substring of another can never produce a false match. First
//! insertion order is kept only to make serialization stable between runs.

use crate::store::Fingerprint;
use std::collections::HashSet;

/// Token separator in the persisted form
pub const DELIMITER: char = ',';

/// Marker written by older versions after discarding the history
const LEGACY_RESET_MARKER: &str = "start";

/// Set of fingerprints already forwarded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    order: Vec<Fingerprint>,
    members: HashSet<Fingerprint>,
}

impl SeenSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the persisted comma-terminated form
    ///
    /// A leading byte-order mark, empty tokens and the legacy `start` marker
    /// are skipped. Any other token
    /// that is not a hex digest marks the whole input as corrupt, and an empty
    /// set is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use forum_relay::store::{Fingerprint, SeenSet};
    ///
    /// let fp = Fingerprint::of("http://muchong.com/t-1-1");
    /// let set = SeenSet::load(&format!("{},", fp));
    /// assert!(set.contains(&fp));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn load(raw: &str) -> Self {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        let mut set = Self::new();

        for token in raw.split(DELIMITER).map(str::trim) {
            if token.is_empty() || token == LEGACY_RESET_MARKER {
                continue;
            }

            match Fingerprint::parse(token) {
                Some(fingerprint) => {
                    set.add(fingerprint);
                }
                None => {
                    tracing::warn!(
                        "Seen-link history is malformed (bad token {:?}); starting from empty",
                        truncate_token(token)
                    );
                    return Self::new();
                }
            }
        }

        set
    }

    /// Returns true if the set holds more than `max_entries` fingerprints
    pub fn exceeds(&self, max_entries: usize) -> bool {
        self.len() > max_entries
    }

    /// Discards the whole history when it holds more than `max_entries` fingerprints
    ///
    /// A set of exactly `max_entries` is kept.
    pub fn capacity_check(self, max_entries: usize) -> Self {
        if self.exceeds(max_entries) {
            tracing::warn!(
                "Seen-link history holds {} entries (limit {}); resetting",
                self.len(),
                max_entries
            );
            return Self::new();
        }
        self
    }

    /// Exact-token membership test
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.members.contains(fingerprint)
    }

    /// Inserts a fingerprint
    ///
    /// Returns `false` if it was already present, in which case nothing changes.
    pub fn add(&mut self, fingerprint: Fingerprint) -> bool {
        if self.members.contains(&fingerprint) {
            return false;
        }
        self.members.insert(fingerprint.clone());
        self.order.push(fingerprint);
        true
    }

    /// Renders the persisted form: every token followed by a comma
    pub fn serialize(&self) -> String {
        let capacity = self.order.iter().map(|f| f.as_str().len() + 1).sum();
        let mut out = String::with_capacity(capacity);
        for fingerprint in &self.order {
            out.push_str(fingerprint.as_str());
            out.push(DELIMITER);
        }
        out
    }

    /// Number of fingerprints held
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates fingerprints in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Fingerprint> {
        self.order.iter()
    }
}

fn truncate_token(token: &str) -> String {
    token.chars().take(32).collect()
}
