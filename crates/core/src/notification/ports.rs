//! Port interfaces for outbound notifications

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadflow_domain::{OutboxEntry, Result, SmsReceipt};

/// Telegram Bot API.
#[async_trait]
pub trait TelegramSender: Send + Sync {
    /// Send an HTML-formatted message to a chat.
    async fn send_message(&self, chat_id: &str, html: &str) -> Result<()>;
}

/// SMS provider.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Provider name for logs.
    fn provider(&self) -> &'static str;

    async fn send_sms(&self, phone: &str, text: &str) -> Result<SmsReceipt>;
}

/// Durable record of notification intents.
#[async_trait]
pub trait NotificationOutbox: Send + Sync {
    async fn enqueue(&self, entry: &OutboxEntry) -> Result<()>;

    async fn mark_sent(&self, id: &str, sent_at: DateTime<Utc>) -> Result<()>;

    async fn mark_failed(&self, id: &str, error: &str) -> Result<()>;

    /// Oldest pending entries first.
    async fn list_pending(&self, limit: usize) -> Result<Vec<OutboxEntry>>;

    async fn list_for_lead(&self, lead_id: i64) -> Result<Vec<OutboxEntry>>;
}
