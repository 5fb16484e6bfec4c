//! Delivery of new-link messages
//!
//! A [`Notifier`] makes exactly one delivery attempt per message. The relay
//! logs failures and moves on, so a link is never delivered twice.

mod telegram;

pub use telegram::TelegramNotifier;

use crate::relay::CandidateLink;
use crate::RelayError;
use async_trait::async_trait;

/// A channel that new-link messages are delivered to
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Attempts a single delivery of an HTML-formatted message
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), RelayError>;
}

/// Notifier that only logs messages, used for dry runs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), RelayError> {
        tracing::info!("[dry-run] would send to {}: {}", chat_id, text);
        Ok(())
    }
}

/// Renders the outbound message for a candidate: `<a href='URL'>TITLE</a>`
///
/// Telegram's HTML parse mode rejects a bare `&`, so it is escaped in both
/// parts; `'` is escaped in the URL since it delimits the attribute.
pub fn format_message(link: &CandidateLink) -> String {
    let url = link.url.replace('&', "&amp;").replace('\'', "&#39;");
    let title = link.title.replace('&', "&amp;");
    format!("<a href='{}'>{}</a>", url, title)
}
