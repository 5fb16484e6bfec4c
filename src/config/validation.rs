use crate::config::types::{Config, SourceConfig, StoreConfig, TelegramConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_store_config(&config.store)?;
    validate_telegram_config(&config.telegram)?;
    Ok(())
}

/// Validates listing page configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    validate_http_url("listing-url", &config.listing_url)?;
    validate_http_url("base-url", &config.base_url)?;

    if !config.referer.is_empty() {
        validate_http_url("referer", &config.referer)?;
    }

    validate_selector("link-selector", &config.link_selector)?;
    if !config.type_filter.trim().is_empty() {
        validate_selector("row-selector", &config.row_selector)?;
        validate_selector("tag-selector", &config.tag_selector)?;
    }

    if config.timeout_secs < 1 || config.timeout_secs > 120 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 1 and 120, got {}",
            config.timeout_secs
        )));
    }

    if config.default_charset.trim().is_empty() {
        return Err(ConfigError::Validation(
            "default-charset cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates state file configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation("store path cannot be empty".to_string()));
    }

    if config.max_entries < 1 {
        return Err(ConfigError::Validation(format!(
            "max-entries must be >= 1, got {}",
            config.max_entries
        )));
    }

    Ok(())
}

/// Validates Telegram delivery configuration
fn validate_telegram_config(config: &TelegramConfig) -> Result<(), ConfigError> {
    if config.chat_id.trim().is_empty() {
        return Err(ConfigError::Validation("chat-id cannot be empty".to_string()));
    }

    validate_http_url("api-base", &config.api_base)?;

    // Environment variable names: non-empty, no '=' or NUL
    if config.token_env.is_empty()
        || config.token_env.contains('=')
        || config.token_env.contains('\0')
    {
        return Err(ConfigError::Validation(format!(
            "token-env must be a valid environment variable name, got '{}'",
            config.token_env
        )));
    }

    Ok(())
}

fn validate_selector(key: &str, value: &str) -> Result<(), ConfigError> {
    if Selector::parse(value).is_err() {
        return Err(ConfigError::Validation(format!(
            "{} is not a valid CSS selector: '{}'",
            key, value
        )));
    }
    Ok(())
}

/// Validates that a value parses as an absolute http(s) URL
fn validate_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url =
        Url::parse(value).map_err(|e| ConfigError::InvalidUrl(format!("{} '{}': {}", key, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use http or https",
            key, value
        )));
    }

    Ok(())
}
