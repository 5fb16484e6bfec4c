//! Forum-Relay: forwards new forum posts to a Telegram channel
//!
//! This crate polls a single forum listing page, extracts post links,
//! deduplicates them against a persisted history of fingerprints and
//! delivers each newly discovered link to a messaging channel.

pub mod config;
pub mod notify;
pub mod output;
pub mod relay;
pub mod store;

use thiserror::Error;

/// Main error type for Forum-Relay operations
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Delivery to {chat_id} failed: {message}")]
    Delivery { chat_id: String, message: String },

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Creates a delivery error for the given chat
    pub fn delivery(chat_id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Delivery {
            chat_id: chat_id.into(),
            message: message.to_string(),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Delivery token not set: environment variable {0} is empty or missing")]
    MissingToken(String),
}

/// Result type alias for Forum-Relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use output::{RunOutcome, RunReport};
pub use relay::{CandidateLink, Relay};
pub use store::{Fingerprint, SeenSet, StateFile};
