//! SQLite implementation of the named counter port.
//!
//! Counters are keyed by `(code, company_id)`; a `NULL` company is the global
//! counter. Each value is `prefix` + `number_next` zero-padded to `padding`
//! digits, and `number_next` advances by `step` in the same transaction.

use std::sync::Arc;

use async_trait::async_trait;
use leadflow_core::SequenceGenerator;
use leadflow_domain::Result as DomainResult;
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use tracing::debug;

use super::common::with_connection;
use super::manager::{map_sql_error, DbManager};

pub struct SqliteSequenceRepository {
    db: Arc<DbManager>,
}

impl SqliteSequenceRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Create or reconfigure a counter. An existing counter keeps its
    /// position unless `number_next` is given.
    pub async fn configure(
        &self,
        code: &str,
        company_id: Option<i64>,
        prefix: &str,
        padding: u32,
        number_next: Option<i64>,
    ) -> DomainResult<()> {
        let code = code.to_string();
        let prefix = prefix.to_string();
        with_connection(&self.db, move |conn| {
            let tx = conn.transaction().map_err(map_sql_error)?;
            let updated = tx
                .execute(
                    "UPDATE sequences SET prefix = ?3, padding = ?4,
                        number_next = COALESCE(?5, number_next)
                     WHERE code = ?1 AND company_id IS ?2",
                    params![code, company_id, prefix, padding, number_next],
                )
                .map_err(map_sql_error)?;
            if updated == 0 {
                tx.execute(
                    "INSERT INTO sequences (code, company_id, prefix, padding, number_next, step)
                     VALUES (?1, ?2, ?3, ?4, COALESCE(?5, 1), 1)",
                    params![code, company_id, prefix, padding, number_next],
                )
                .map_err(map_sql_error)?;
            }
            tx.commit().map_err(map_sql_error)
        })
        .await
    }
}

#[async_trait]
impl SequenceGenerator for SqliteSequenceRepository {
    async fn next_value(&self, code: &str, company_id: Option<i64>) -> DomainResult<Option<String>> {
        let code = code.to_string();
        with_connection(&self.db, move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(map_sql_error)?;

            let counter: Option<(i64, String, i64, i64, i64)> = tx
                .query_row(
                    "SELECT id, prefix, padding, number_next, step FROM sequences
                     WHERE code = ?1 AND company_id IS ?2",
                    params![code, company_id],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
                )
                .optional()
                .map_err(map_sql_error)?;

            let Some((id, prefix, padding, number, step)) = counter else {
                return Ok(None);
            };

            tx.execute(
                "UPDATE sequences SET number_next = number_next + ?2 WHERE id = ?1",
                params![id, step.max(1)],
            )
            .map_err(map_sql_error)?;
            tx.commit().map_err(map_sql_error)?;

            let width = usize::try_from(padding).unwrap_or(0);
            let value = format!("{prefix}{number:0width$}");
            debug!(code = %code, company_id = ?company_id, value = %value, "sequence value issued");
            Ok(Some(value))
        })
        .await
    }
}
