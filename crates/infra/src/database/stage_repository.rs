//! SQLite implementations of the stage catalogue and stage-history ports.

use std::sync::Arc;

use async_trait::async_trait;
use leadflow_core::{StageHistoryRepository, StageRepository};
use leadflow_domain::{Result as DomainResult, Stage, StageChangeEvent};
use rusqlite::{params, OptionalExtension, Row};

use super::common::{get_opt_enum, get_time, to_millis, with_connection};
use super::manager::{map_sql_error, DbManager};

const STAGE_COLUMNS: &str = "id, name, sequence, is_won, lifecycle, color_hex, text_color_hex";

pub struct SqliteStageRepository {
    db: Arc<DbManager>,
}

impl SqliteStageRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or replace a stage definition.
    pub async fn save(&self, stage: &Stage) -> DomainResult<()> {
        let stage = stage.clone();
        with_connection(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO stages (id, name, sequence, is_won, lifecycle, color_hex, text_color_hex)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    sequence = excluded.sequence,
                    is_won = excluded.is_won,
                    lifecycle = excluded.lifecycle,
                    color_hex = excluded.color_hex,
                    text_color_hex = excluded.text_color_hex",
                params![
                    stage.id,
                    stage.name,
                    stage.sequence,
                    stage.is_won,
                    stage.lifecycle.map(|s| s.as_str()),
                    stage.color_hex,
                    stage.text_color_hex,
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl StageRepository for SqliteStageRepository {
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Stage>> {
        with_connection(&self.db, move |conn| {
            conn.query_row(
                &format!("SELECT {STAGE_COLUMNS} FROM stages WHERE id = ?1"),
                [id],
                map_stage_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
    }

    async fn list(&self) -> DomainResult<Vec<Stage>> {
        with_connection(&self.db, |conn| {
            let mut stmt = conn
                .prepare(&format!("SELECT {STAGE_COLUMNS} FROM stages ORDER BY sequence, id"))
                .map_err(map_sql_error)?;
            let rows = stmt.query_map([], map_stage_row).map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
    }
}

fn map_stage_row(row: &Row<'_>) -> rusqlite::Result<Stage> {
    Ok(Stage {
        id: row.get("id")?,
        name: row.get("name")?,
        sequence: row.get("sequence")?,
        is_won: row.get("is_won")?,
        lifecycle: get_opt_enum(row, "lifecycle")?,
        color_hex: row.get("color_hex")?,
        text_color_hex: row.get("text_color_hex")?,
    })
}

/// Stage-change audit trail.
pub struct SqliteStageHistoryRepository {
    db: Arc<DbManager>,
}

impl SqliteStageHistoryRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StageHistoryRepository for SqliteStageHistoryRepository {
    async fn record(&self, event: &StageChangeEvent) -> DomainResult<()> {
        let event = event.clone();
        with_connection(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO stage_history (lead_id, occurred_at, stage_name, state)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    event.lead_id,
                    to_millis(event.occurred_at),
                    event.stage_name,
                    event.state.map(|s| s.as_str()),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }

    async fn list_for_lead(&self, lead_id: i64) -> DomainResult<Vec<StageChangeEvent>> {
        with_connection(&self.db, move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT lead_id, occurred_at, stage_name, state FROM stage_history
                     WHERE lead_id = ?1 ORDER BY occurred_at, id",
                )
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map([lead_id], |row| {
                    Ok(StageChangeEvent {
                        lead_id: row.get("lead_id")?,
                        occurred_at: get_time(row, "occurred_at")?,
                        stage_name: row.get("stage_name")?,
                        state: get_opt_enum(row, "state")?,
                    })
                })
                .map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
    }
}
