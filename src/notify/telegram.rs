//! Telegram Bot API notifier

use crate::config::TelegramConfig;
use crate::notify::Notifier;
use crate::RelayError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct SendMessageBody<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages through `sendMessage` in HTML parse mode
pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
    disable_preview: bool,
}

impl TelegramNotifier {
    /// Creates a notifier for the bot identified by `token`
    pub fn new(config: &TelegramConfig, token: &str) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|source| RelayError::Http {
                url: config.api_base.clone(),
                source,
            })?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                config.api_base.trim_end_matches('/'),
                token
            ),
            disable_preview: config.disable_preview,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), RelayError> {
        let body = SendMessageBody {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: self.disable_preview,
        };

        // The endpoint embeds the bot token; keep it out of error messages
        let res = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::delivery(chat_id, e.without_url()))?;

        let status = res.status();
        let raw = res
            .text()
            .await
            .map_err(|e| RelayError::delivery(chat_id, e.without_url()))?;

        match serde_json::from_str::<ApiResponse>(&raw) {
            Ok(api) if api.ok && status.is_success() => Ok(()),
            Ok(api) => Err(RelayError::delivery(
                chat_id,
                format!(
                    "Telegram API error {}: {}",
                    status,
                    api.description.unwrap_or_else(|| "unknown".to_string())
                ),
            )),
            Err(_) => Err(RelayError::delivery(
                chat_id,
                format!("Telegram API error {}: unexpected response body", status),
            )),
        }
    }
}
