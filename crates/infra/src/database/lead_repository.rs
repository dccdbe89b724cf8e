//! SQLite implementation of the lead repository port.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use leadflow_core::LeadRepository;
use leadflow_domain::{
    Lead, LeadCategory, LeadNote, LeadflowError, NotificationKind, Result as DomainResult,
};
use once_cell::sync::Lazy;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

use super::common::{
    get_opt_enum, get_opt_time, get_time, opt_millis, placeholders, to_millis, with_connection,
};
use super::manager::{map_sql_error, DbManager};

/// Every column except `id`, in the order produced by [`lead_values`].
const WRITABLE_COLUMNS: [&str; 37] = [
    "name",
    "category",
    "stage_id",
    "usta_id",
    "state_id",
    "region_id",
    "company_id",
    "responsible",
    "phone",
    "mobile",
    "partner_name",
    "partner_phone",
    "partner_mobile",
    "street",
    "city",
    "state_name",
    "country_name",
    "probability",
    "work_amount",
    "work_text",
    "repeat_request",
    "geo_link",
    "geo_lat",
    "geo_lng",
    "created_at",
    "accepted_at",
    "started_at",
    "finished_at",
    "confirmed_at",
    "stage_entered_at",
    "updated_at",
    "work_time_spent_hours",
    "service_number",
    "tg_card_chat_id",
    "notify_new_sent",
    "notify_won_sent",
    "active",
];

static INSERT_SQL: Lazy<String> = Lazy::new(|| {
    format!(
        "INSERT INTO leads ({}) VALUES ({})",
        WRITABLE_COLUMNS.join(", "),
        placeholders(1, WRITABLE_COLUMNS.len())
    )
});

// A stored service number is never replaced.
static UPDATE_SQL: Lazy<String> = Lazy::new(|| {
    let assignments: Vec<String> = WRITABLE_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| match *column {
            "service_number" => {
                format!("service_number = COALESCE(NULLIF(service_number, ''), ?{})", i + 1)
            }
            _ => format!("{column} = ?{}", i + 1),
        })
        .collect();
    format!(
        "UPDATE leads SET {} WHERE id = ?{}",
        assignments.join(", "),
        WRITABLE_COLUMNS.len() + 1
    )
});

static SELECT_SQL: Lazy<String> =
    Lazy::new(|| format!("SELECT id, {} FROM leads", WRITABLE_COLUMNS.join(", ")));

pub struct SqliteLeadRepository {
    db: Arc<DbManager>,
}

impl SqliteLeadRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LeadRepository for SqliteLeadRepository {
    async fn insert(&self, lead: Lead) -> DomainResult<Lead> {
        with_connection(&self.db, move |conn| {
            conn.execute(INSERT_SQL.as_str(), params_from_iter(lead_values(&lead)))
                .map_err(map_sql_error)?;
            let mut stored = lead;
            stored.id = conn.last_insert_rowid();
            Ok(stored)
        })
        .await
    }

    async fn update(&self, lead: &Lead) -> DomainResult<()> {
        let lead = lead.clone();
        with_connection(&self.db, move |conn| {
            let mut values = lead_values(&lead).to_vec();
            values.push(Value::Integer(lead.id));
            let changed =
                conn.execute(UPDATE_SQL.as_str(), params_from_iter(values)).map_err(map_sql_error)?;
            if changed == 0 {
                return Err(LeadflowError::NotFound(format!("Lead {}", lead.id)));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Lead>> {
        with_connection(&self.db, move |conn| {
            conn.query_row(&format!("{} WHERE id = ?1", SELECT_SQL.as_str()), [id], map_lead_row)
                .optional()
                .map_err(map_sql_error)
        })
        .await
    }

    async fn exists(&self, id: i64) -> DomainResult<bool> {
        with_connection(&self.db, move |conn| {
            conn.query_row("SELECT EXISTS(SELECT 1 FROM leads WHERE id = ?1)", [id], |row| row.get(0))
                .map_err(map_sql_error)
        })
        .await
    }

    async fn list_missing_service_number(
        &self,
        category: Option<LeadCategory>,
    ) -> DomainResult<Vec<Lead>> {
        with_connection(&self.db, move |conn| {
            let sql = format!(
                "{} WHERE (service_number IS NULL OR service_number = '') \
                 AND (?1 IS NULL OR category = ?1) ORDER BY id",
                SELECT_SQL.as_str()
            );
            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let rows = stmt
                .query_map([category.map(|c| c.as_str())], map_lead_row)
                .map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
    }

    async fn set_service_number(&self, id: i64, number: &str) -> DomainResult<()> {
        let number = number.to_string();
        with_connection(&self.db, move |conn| {
            conn.execute(
                "UPDATE leads SET service_number = ?2 \
                 WHERE id = ?1 AND (service_number IS NULL OR service_number = '')",
                params![id, number],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }

    async fn mark_notified(&self, id: i64, kind: NotificationKind) -> DomainResult<()> {
        let column = match kind {
            NotificationKind::NewRequest => "notify_new_sent",
            NotificationKind::Won => "notify_won_sent",
        };
        with_connection(&self.db, move |conn| {
            conn.execute(&format!("UPDATE leads SET {column} = 1 WHERE id = ?1"), [id])
                .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }

    async fn post_note(&self, lead_id: i64, body: &str) -> DomainResult<LeadNote> {
        let body = body.to_string();
        with_connection(&self.db, move |conn| {
            let created_at = Utc::now();
            conn.execute(
                "INSERT INTO lead_notes (lead_id, body, created_at) VALUES (?1, ?2, ?3)",
                params![lead_id, body, to_millis(created_at)],
            )
            .map_err(map_sql_error)?;
            Ok(LeadNote { id: conn.last_insert_rowid(), lead_id, body, created_at })
        })
        .await
    }

    async fn list_notes(&self, lead_id: i64) -> DomainResult<Vec<LeadNote>> {
        with_connection(&self.db, move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, lead_id, body, created_at FROM lead_notes \
                     WHERE lead_id = ?1 ORDER BY created_at, id",
                )
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map([lead_id], |row| {
                    Ok(LeadNote {
                        id: row.get("id")?,
                        lead_id: row.get("lead_id")?,
                        body: row.get("body")?,
                        created_at: get_time(row, "created_at")?,
                    })
                })
                .map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
    }

    async fn count_by_stage(&self) -> DomainResult<HashMap<i64, u64>> {
        with_connection(&self.db, |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT stage_id, COUNT(*) FROM leads WHERE stage_id IS NOT NULL GROUP BY stage_id",
                )
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))
                .map_err(map_sql_error)?;
            rows.map(|r| r.map(|(stage, count)| (stage, count.max(0) as u64)))
                .collect::<rusqlite::Result<HashMap<_, _>>>()
                .map_err(map_sql_error)
        })
        .await
    }

    async fn count_for_technician(&self, usta_id: i64, stage_ids: &[i64]) -> DomainResult<u64> {
        if stage_ids.is_empty() {
            return Ok(0);
        }
        let stage_ids = stage_ids.to_vec();
        with_connection(&self.db, move |conn| {
            let sql = format!(
                "SELECT COUNT(*) FROM leads WHERE usta_id = ?1 AND active = 1 AND stage_id IN ({})",
                placeholders(2, stage_ids.len())
            );
            let values = std::iter::once(usta_id).chain(stage_ids);
            let count: i64 = conn
                .query_row(&sql, params_from_iter(values), |row| row.get(0))
                .map_err(map_sql_error)?;
            Ok(count.max(0) as u64)
        })
        .await
    }
}

fn lead_values(lead: &Lead) -> [Value; 37] {
    [
        lead.name.clone().into(),
        lead.category.map(|c| c.as_str().to_string()).into(),
        lead.stage_id.into(),
        lead.usta_id.into(),
        lead.state_id.into(),
        lead.region_id.into(),
        lead.company_id.into(),
        lead.responsible.clone().into(),
        lead.phone.clone().into(),
        lead.mobile.clone().into(),
        lead.partner_name.clone().into(),
        lead.partner_phone.clone().into(),
        lead.partner_mobile.clone().into(),
        lead.street.clone().into(),
        lead.city.clone().into(),
        lead.state_name.clone().into(),
        lead.country_name.clone().into(),
        lead.probability.into(),
        lead.work_amount.into(),
        lead.work_text.clone().into(),
        lead.repeat_request.into(),
        lead.geo_link.clone().into(),
        lead.geo_lat.into(),
        lead.geo_lng.into(),
        to_millis(lead.created_at).into(),
        opt_millis(lead.accepted_at).into(),
        opt_millis(lead.started_at).into(),
        opt_millis(lead.finished_at).into(),
        opt_millis(lead.confirmed_at).into(),
        opt_millis(lead.stage_entered_at).into(),
        to_millis(lead.updated_at).into(),
        lead.work_time_spent_hours.into(),
        lead.service_number.clone().into(),
        lead.tg_card_chat_id.clone().into(),
        lead.notify_new_sent.into(),
        lead.notify_won_sent.into(),
        lead.active.into(),
    ]
}

fn map_lead_row(row: &Row<'_>) -> rusqlite::Result<Lead> {
    Ok(Lead {
        id: row.get("id")?,
        name: row.get("name")?,
        category: get_opt_enum(row, "category")?,
        stage_id: row.get("stage_id")?,
        usta_id: row.get("usta_id")?,
        state_id: row.get("state_id")?,
        region_id: row.get("region_id")?,
        company_id: row.get("company_id")?,
        responsible: row.get("responsible")?,
        phone: row.get("phone")?,
        mobile: row.get("mobile")?,
        partner_name: row.get("partner_name")?,
        partner_phone: row.get("partner_phone")?,
        partner_mobile: row.get("partner_mobile")?,
        street: row.get("street")?,
        city: row.get("city")?,
        state_name: row.get("state_name")?,
        country_name: row.get("country_name")?,
        probability: row.get("probability")?,
        work_amount: row.get("work_amount")?,
        work_text: row.get("work_text")?,
        repeat_request: row.get("repeat_request")?,
        geo_link: row.get("geo_link")?,
        geo_lat: row.get("geo_lat")?,
        geo_lng: row.get("geo_lng")?,
        created_at: get_time(row, "created_at")?,
        accepted_at: get_opt_time(row, "accepted_at")?,
        started_at: get_opt_time(row, "started_at")?,
        finished_at: get_opt_time(row, "finished_at")?,
        confirmed_at: get_opt_time(row, "confirmed_at")?,
        stage_entered_at: get_opt_time(row, "stage_entered_at")?,
        updated_at: get_time(row, "updated_at")?,
        work_time_spent_hours: row.get("work_time_spent_hours")?,
        service_number: row.get("service_number")?,
        tg_card_chat_id: row.get("tg_card_chat_id")?,
        notify_new_sent: row.get("notify_new_sent")?,
        notify_won_sent: row.get("notify_won_sent")?,
        active: row.get("active")?,
    })
}
