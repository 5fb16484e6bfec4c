use serde::Deserialize;

/// Main configuration structure for Forum-Relay
///
/// Every section and key is optional; missing values fall back to the
/// defaults for the muchong.com adjustment board.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub store: StoreConfig,
    pub telegram: TelegramConfig,
}

/// Listing page and request configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SourceConfig {
    /// The listing page polled on every run
    pub listing_url: String,

    /// Prefix joined with each relative post href
    pub base_url: String,

    /// CSS selector identifying post subject anchors
    pub link_selector: String,

    /// Only forward rows whose type tag contains this text; empty disables the filter
    pub type_filter: String,

    /// CSS selector for one listing row, used with `type_filter`
    pub row_selector: String,

    /// CSS selector for the type tag inside a row, used with `type_filter`
    pub tag_selector: String,

    /// Referer header sent with the listing request
    pub referer: String,

    /// Accept-Language header sent with the listing request
    pub accept_language: String,

    /// Charset used when the server does not declare one
    pub default_charset: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            listing_url: "http://muchong.com/f-430-1".to_string(),
            base_url: "http://muchong.com/".to_string(),
            link_selector: "a.a_subject".to_string(),
            type_filter: String::new(),
            row_selector: "tr.forum_list".to_string(),
            tag_selector: "th.thread-name span > a.xmc_blue".to_string(),
            referer: "http://muchong.com/f-430-1-typeid-2304".to_string(),
            accept_language: "zh".to_string(),
            default_charset: "gbk".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Seen-link state file configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StoreConfig {
    /// Path to the comma-terminated fingerprint file
    pub path: String,

    /// Fingerprint count above which the history is discarded
    pub max_entries: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "MuchongSaved.txt".to_string(),
            max_entries: crate::store::DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Telegram delivery configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TelegramConfig {
    /// Channel or chat identifier (e.g. "@channel")
    pub chat_id: String,

    /// Bot API root, overridable for testing
    pub api_base: String,

    /// Name of the environment variable holding the bot token
    pub token_env: String,

    /// Suppress link previews in delivered messages
    pub disable_preview: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            chat_id: "@muchongtiaoji".to_string(),
            api_base: "https://api.telegram.org".to_string(),
            token_env: "TELEGRAM_BOT_TOKEN".to_string(),
            disable_preview: false,
        }
    }
}
