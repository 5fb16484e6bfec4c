//! Configuration module for Forum-Relay
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The delivery token never lives in the file; it is read from the environment
//! variable the config names.
//!
//! # Example
//!
//! ```no_run
//! use forum_relay::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("relay.toml")).unwrap();
//! println!("Forwarding to {}", config.telegram.chat_id);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, SourceConfig, StoreConfig, TelegramConfig};

pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, resolve_token,
};
