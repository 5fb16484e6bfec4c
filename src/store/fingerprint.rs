//! Link fingerprints
//!
//! A fingerprint is the lowercase hex MD5 digest of a post URL, the same token
//! existing history files hold. It is the only thing the seen-link history
//! records about a link.

use md5::{Digest, Md5};
use std::fmt;

/// Opaque, comparable identity token for a post URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint of a URL from its UTF-8 bytes
    ///
    /// # Example
    ///
    /// ```
    /// use forum_relay::store::Fingerprint;
    ///
    /// let a = Fingerprint::of("http://muchong.com/t-1-1");
    /// let b = Fingerprint::of("http://muchong.com/t-1-1");
    /// assert_eq!(a, b);
    /// assert_eq!(a.as_str().len(), 32);
    /// ```
    pub fn of(url: &str) -> Self {
        let mut hasher = Md5::new();
        hasher.update(url.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Parses a persisted token back into a fingerprint
    ///
    /// Accepts any non-empty run of ASCII hex digits, normalised to lowercase.
    /// Returns `None` for anything else.
    pub fn parse(token: &str) -> Option<Self> {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(token.to_ascii_lowercase()))
    }

    /// Returns the hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
