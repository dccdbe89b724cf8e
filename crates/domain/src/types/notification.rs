//! Notification outbox entries
//!
//! Each won/new transition persists one entry per channel before delivery is
//! attempted, so a failed or interrupted send stays visible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_domain_status_conversions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewRequest,
    Won,
}

impl_domain_status_conversions!(NotificationKind {
    NewRequest => "new_request",
    Won => "won",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Telegram,
    Sms,
}

impl_domain_status_conversions!(Channel {
    Telegram => "telegram",
    Sms => "sms",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboxStatus {
    Pending,
    Sent,
    Failed,
}

impl_domain_status_conversions!(OutboxStatus {
    Pending => "pending",
    Sent => "sent",
    Failed => "failed",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub id: String, // UUIDv7
    pub lead_id: i64,
    pub kind: NotificationKind,
    pub channel: Channel,
    /// Telegram chat id or customer phone number.
    pub recipient: String,
    pub body: String,
    pub status: OutboxStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl OutboxEntry {
    pub fn pending(
        lead_id: i64,
        kind: NotificationKind,
        channel: Channel,
        recipient: impl Into<String>,
        body: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            lead_id,
            kind,
            channel,
            recipient: recipient.into(),
            body: body.into(),
            status: OutboxStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: now,
            sent_at: None,
        }
    }
}

/// Provider acknowledgement of an accepted SMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsReceipt {
    pub provider_message_id: Option<String>,
    pub status: String,
}
