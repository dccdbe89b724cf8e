//! SQLite-backed implementation of the notification outbox port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadflow_core::NotificationOutbox;
use leadflow_domain::{LeadflowError, OutboxEntry, OutboxStatus, Result as DomainResult};
use rusqlite::{params, Row};
use tracing::warn;

use super::common::{
    get_enum, get_opt_time, get_time, opt_millis, to_millis, usize_to_i64, with_connection,
};
use super::manager::{map_sql_error, DbManager};

const OUTBOX_COLUMNS: &str =
    "id, lead_id, kind, channel, recipient, body, status, attempts, last_error, created_at, sent_at";

pub struct SqliteNotificationOutbox {
    db: Arc<DbManager>,
}

impl SqliteNotificationOutbox {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    async fn list(&self, sql: String, param: i64) -> DomainResult<Vec<OutboxEntry>> {
        with_connection(&self.db, move |conn| {
            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let rows = stmt.query_map([param], map_outbox_row).map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
    }
}

#[async_trait]
impl NotificationOutbox for SqliteNotificationOutbox {
    async fn enqueue(&self, entry: &OutboxEntry) -> DomainResult<()> {
        let entry = entry.clone();
        with_connection(&self.db, move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO notification_outbox ({OUTBOX_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                ),
                params![
                    entry.id,
                    entry.lead_id,
                    entry.kind.as_str(),
                    entry.channel.as_str(),
                    entry.recipient,
                    entry.body,
                    entry.status.as_str(),
                    entry.attempts,
                    entry.last_error,
                    to_millis(entry.created_at),
                    opt_millis(entry.sent_at),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }

    async fn mark_sent(&self, id: &str, sent_at: DateTime<Utc>) -> DomainResult<()> {
        let id = id.to_string();
        with_connection(&self.db, move |conn| {
            let changed = conn
                .execute(
                    "UPDATE notification_outbox
                     SET status = 'sent', attempts = attempts + 1, sent_at = ?2, last_error = NULL
                     WHERE id = ?1",
                    params![id, to_millis(sent_at)],
                )
                .map_err(map_sql_error)?;
            ensure_found(changed, &id)
        })
        .await
    }

    async fn mark_failed(&self, id: &str, error: &str) -> DomainResult<()> {
        let id = id.to_string();
        let error = error.to_string();
        with_connection(&self.db, move |conn| {
            let changed = conn
                .execute(
                    "UPDATE notification_outbox
                     SET status = 'failed', attempts = attempts + 1, last_error = ?2
                     WHERE id = ?1",
                    params![id, error],
                )
                .map_err(map_sql_error)?;
            ensure_found(changed, &id)
        })
        .await
    }

    async fn list_pending(&self, limit: usize) -> DomainResult<Vec<OutboxEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.list(
            format!(
                "SELECT {OUTBOX_COLUMNS} FROM notification_outbox
                 WHERE status = 'pending' ORDER BY created_at ASC, id ASC LIMIT ?1"
            ),
            usize_to_i64(limit),
        )
        .await
    }

    async fn list_for_lead(&self, lead_id: i64) -> DomainResult<Vec<OutboxEntry>> {
        self.list(
            format!(
                "SELECT {OUTBOX_COLUMNS} FROM notification_outbox
                 WHERE lead_id = ?1 ORDER BY created_at ASC, id ASC"
            ),
            lead_id,
        )
        .await
    }
}

fn ensure_found(changed: usize, id: &str) -> DomainResult<()> {
    if changed == 0 {
        Err(LeadflowError::NotFound(format!("Outbox entry {id}")))
    } else {
        Ok(())
    }
}

fn map_outbox_row(row: &Row<'_>) -> rusqlite::Result<OutboxEntry> {
    let id: String = row.get("id")?;
    let status_raw: String = row.get("status")?;
    let status = parse_status(&id, &status_raw);

    Ok(OutboxEntry {
        lead_id: row.get("lead_id")?,
        kind: get_enum(row, "kind")?,
        channel: get_enum(row, "channel")?,
        recipient: row.get("recipient")?,
        body: row.get("body")?,
        status,
        attempts: row.get("attempts")?,
        last_error: row.get("last_error")?,
        created_at: get_time(row, "created_at")?,
        sent_at: get_opt_time(row, "sent_at")?,
        id,
    })
}

fn parse_status(id: &str, raw: &str) -> OutboxStatus {
    match raw.parse::<OutboxStatus>() {
        Ok(status) => status,
        Err(err) => {
            warn!(
                entry_id = %id,
                raw_status = %raw,
                error = %err,
                "invalid outbox status in database, treating as failed"
            );
            OutboxStatus::Failed
        }
    }
}
