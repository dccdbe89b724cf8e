//! SQLite implementation of the finance ledger port.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use leadflow_core::FinanceRepository;
use leadflow_domain::{
    FinanceKind, FinanceRecord, FinanceSummary, NewFinanceRecord, Result as DomainResult,
};
use rusqlite::{params, params_from_iter};

use super::common::{get_enum, get_time, placeholders, to_millis, with_connection};
use super::manager::{map_sql_error, DbManager};

pub struct SqliteFinanceRepository {
    db: Arc<DbManager>,
}

impl SqliteFinanceRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FinanceRepository for SqliteFinanceRepository {
    async fn insert(&self, record: &NewFinanceRecord) -> DomainResult<FinanceRecord> {
        let record = record.clone();
        with_connection(&self.db, move |conn| {
            let created_at = Utc::now();
            let signed_amount = record.signed_amount();
            conn.execute(
                "INSERT INTO finance_records
                    (lead_id, employee_id, kind, direction, amount, signed_amount, note, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.lead_id,
                    record.employee_id,
                    record.kind.as_str(),
                    record.direction.as_str(),
                    record.amount,
                    signed_amount,
                    record.note,
                    to_millis(created_at),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(FinanceRecord {
                id: conn.last_insert_rowid(),
                lead_id: record.lead_id,
                employee_id: record.employee_id,
                kind: record.kind,
                direction: record.direction,
                amount: record.amount,
                signed_amount,
                note: record.note,
                created_at,
            })
        })
        .await
    }

    async fn list_for_lead(&self, lead_id: i64) -> DomainResult<Vec<FinanceRecord>> {
        with_connection(&self.db, move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, lead_id, employee_id, kind, direction, amount, signed_amount, note,
                            created_at
                     FROM finance_records WHERE lead_id = ?1 ORDER BY created_at, id",
                )
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map([lead_id], |row| {
                    Ok(FinanceRecord {
                        id: row.get("id")?,
                        lead_id: row.get("lead_id")?,
                        employee_id: row.get("employee_id")?,
                        kind: get_enum(row, "kind")?,
                        direction: get_enum(row, "direction")?,
                        amount: row.get("amount")?,
                        signed_amount: row.get("signed_amount")?,
                        note: row.get("note")?,
                        created_at: get_time(row, "created_at")?,
                    })
                })
                .map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
    }

    async fn summarize(&self, lead_ids: &[i64]) -> DomainResult<HashMap<i64, FinanceSummary>> {
        if lead_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let lead_ids = lead_ids.to_vec();
        with_connection(&self.db, move |conn| {
            let sql = format!(
                "SELECT lead_id, COUNT(*), COALESCE(SUM(signed_amount), 0)
                 FROM finance_records WHERE lead_id IN ({}) GROUP BY lead_id",
                placeholders(1, lead_ids.len())
            );
            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params_from_iter(lead_ids), |row| {
                    let count: i64 = row.get(1)?;
                    Ok((
                        row.get::<_, i64>(0)?,
                        FinanceSummary { count: count.max(0) as u64, amount_sum: row.get(2)? },
                    ))
                })
                .map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<HashMap<_, _>>>().map_err(map_sql_error)
        })
        .await
    }

    async fn has_record(&self, lead_id: i64, kind: FinanceKind) -> DomainResult<bool> {
        with_connection(&self.db, move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM finance_records WHERE lead_id = ?1 AND kind = ?2)",
                params![lead_id, kind.as_str()],
                |row| row.get(0),
            )
            .map_err(map_sql_error)
        })
        .await
    }
}
