//! Notification dispatch through the outbox
//!
//! For every due notification the service:
//! 1. builds one outbox entry per enabled channel with a recipient,
//! 2. persists the entries,
//! 3. sets the lead's guard flag,
//! 4. attempts delivery exactly once and records the outcome.
//!
//! Nothing here fails the triggering lead write; every error is logged and
//! recorded on the outbox entry.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use leadflow_domain::{
    Channel, Lead, LeadflowError, NotificationKind, OperationContext, OutboxEntry, OutboxStatus,
    Result, SmsConfig,
};
use tracing::{debug, info, warn};

use super::ports::{NotificationOutbox, SmsGateway, TelegramSender};
use super::templates;
use crate::lead::ports::{EmployeeRepository, LeadRepository};

/// Outcome counts of a delivery pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
}

pub struct NotificationService {
    outbox: Arc<dyn NotificationOutbox>,
    leads: Arc<dyn LeadRepository>,
    employees: Arc<dyn EmployeeRepository>,
    telegram: Option<Arc<dyn TelegramSender>>,
    sms: Option<Arc<dyn SmsGateway>>,
    sms_config: SmsConfig,
}

impl NotificationService {
    /// Service with no channels; add them with the builder methods.
    pub fn new(
        outbox: Arc<dyn NotificationOutbox>,
        leads: Arc<dyn LeadRepository>,
        employees: Arc<dyn EmployeeRepository>,
    ) -> Self {
        Self { outbox, leads, employees, telegram: None, sms: None, sms_config: SmsConfig::default() }
    }

    pub fn with_telegram(mut self, sender: Arc<dyn TelegramSender>) -> Self {
        self.telegram = Some(sender);
        self
    }

    pub fn with_sms(mut self, gateway: Arc<dyn SmsGateway>, config: SmsConfig) -> Self {
        self.sms = Some(gateway);
        self.sms_config = config;
        self
    }

    /// Record, flag and deliver `kind` for `lead`. Returns the entries with
    /// their final status.
    pub async fn notify(
        &self,
        ctx: &OperationContext,
        lead: &Lead,
        kind: NotificationKind,
    ) -> Vec<OutboxEntry> {
        let planned = self.plan(ctx, lead, kind).await;

        let mut persisted = Vec::with_capacity(planned.len());
        for entry in planned {
            match self.outbox.enqueue(&entry).await {
                Ok(()) => persisted.push(entry),
                Err(err) => warn!(
                    lead_id = lead.id,
                    kind = %kind,
                    channel = %entry.channel,
                    error = %err,
                    "failed to persist notification intent"
                ),
            }
        }

        if let Err(err) = self.leads.mark_notified(lead.id, kind).await {
            warn!(lead_id = lead.id, kind = %kind, error = %err, "failed to set notification flag");
        }

        for entry in &mut persisted {
            self.deliver(entry, ctx.now).await;
        }
        persisted
    }

    /// Deliver entries left pending (e.g. after a crash between enqueue and
    /// delivery). Each entry gets one more attempt.
    pub async fn redeliver_pending(&self, limit: usize, now: DateTime<Utc>) -> Result<DeliveryReport> {
        let mut report = DeliveryReport::default();
        for mut entry in self.outbox.list_pending(limit).await? {
            self.deliver(&mut entry, now).await;
            match entry.status {
                OutboxStatus::Sent => report.sent += 1,
                _ => report.failed += 1,
            }
        }
        info!(sent = report.sent, failed = report.failed, "pending notifications redelivered");
        Ok(report)
    }

    async fn plan(&self, ctx: &OperationContext, lead: &Lead, kind: NotificationKind) -> Vec<OutboxEntry> {
        let mut entries = Vec::with_capacity(2);

        if self.telegram.is_none() {
            info!(lead_id = lead.id, kind = %kind, "telegram bot token not configured, skipping");
        } else if let Some(chat_id) = self.telegram_recipient(lead).await {
            let body = templates::telegram_body(kind, lead, ctx);
            entries.push(OutboxEntry::pending(lead.id, kind, Channel::Telegram, chat_id, body, ctx.now));
        } else {
            debug!(lead_id = lead.id, kind = %kind, "no telegram recipient for lead");
        }

        if self.sms.is_some() {
            match customer_phone(lead) {
                Some(phone) => {
                    let body = templates::sms_body(kind, lead, &self.sms_config);
                    entries.push(OutboxEntry::pending(lead.id, kind, Channel::Sms, phone, body, ctx.now));
                }
                None => debug!(lead_id = lead.id, kind = %kind, "no customer phone for sms"),
            }
        }

        entries
    }

    /// Technician chat, else the lead's card chat.
    async fn telegram_recipient(&self, lead: &Lead) -> Option<String> {
        if let Some(usta_id) = lead.usta_id {
            match self.employees.find_by_id(usta_id).await {
                Ok(Some(usta)) => {
                    if let Some(chat) = usta.telegram_chat() {
                        return Some(chat.to_string());
                    }
                }
                Ok(None) => debug!(lead_id = lead.id, usta_id, "assigned technician not found"),
                Err(err) => warn!(lead_id = lead.id, usta_id, error = %err, "technician lookup failed"),
            }
        }
        lead.tg_card_chat_id
            .as_deref()
            .map(str::trim)
            .filter(|chat| !chat.is_empty())
            .map(str::to_string)
    }

    async fn deliver(&self, entry: &mut OutboxEntry, now: DateTime<Utc>) {
        let result = self.send(entry).await;
        entry.attempts += 1;

        match result {
            Ok(()) => {
                entry.status = OutboxStatus::Sent;
                entry.sent_at = Some(now);
                info!(
                    outbox_id = %entry.id,
                    lead_id = entry.lead_id,
                    kind = %entry.kind,
                    channel = %entry.channel,
                    "notification delivered"
                );
                if let Err(err) = self.outbox.mark_sent(&entry.id, now).await {
                    warn!(outbox_id = %entry.id, error = %err, "failed to mark notification sent");
                }
            }
            Err(err) => {
                let message = err.to_string();
                entry.status = OutboxStatus::Failed;
                entry.last_error = Some(message.clone());
                warn!(
                    outbox_id = %entry.id,
                    lead_id = entry.lead_id,
                    kind = %entry.kind,
                    channel = %entry.channel,
                    error_type = err.label(),
                    error = %err,
                    "notification delivery failed"
                );
                if let Err(err) = self.outbox.mark_failed(&entry.id, &message).await {
                    warn!(outbox_id = %entry.id, error = %err, "failed to mark notification failed");
                }
            }
        }
    }

    async fn send(&self, entry: &OutboxEntry) -> Result<()> {
        match entry.channel {
            Channel::Telegram => {
                let sender = self.telegram.as_ref().ok_or_else(|| {
                    LeadflowError::Config("Telegram bot token is not configured".into())
                })?;
                sender.send_message(&entry.recipient, &entry.body).await
            }
            Channel::Sms => {
                let gateway = self
                    .sms
                    .as_ref()
                    .ok_or_else(|| LeadflowError::Config("SMS provider is not configured".into()))?;
                let receipt = gateway.send_sms(&entry.recipient, &entry.body).await?;
                debug!(
                    provider = gateway.provider(),
                    message_id = ?receipt.provider_message_id,
                    status = %receipt.status,
                    "sms accepted"
                );
                Ok(())
            }
        }
    }
}

/// Customer number for SMS: mobile first.
fn customer_phone(lead: &Lead) -> Option<String> {
    [&lead.mobile, &lead.phone, &lead.partner_mobile, &lead.partner_phone]
        .into_iter()
        .filter_map(|p| p.as_deref())
        .map(str::trim)
        .find(|p| !p.is_empty())
        .map(str::to_string)
}
