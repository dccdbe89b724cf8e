//! SQLite adapter for PBX call records.
//!
//! Source and destination numbers are stored alongside a digits-only copy so
//! tail matching ignores formatting.

use std::sync::Arc;

use async_trait::async_trait;
use leadflow_core::CallRepository;
use leadflow_domain::{digits_only, CallFilter, CallRecord, Result as DomainResult};
use rusqlite::{params, params_from_iter, types::Value};

use super::common::{get_enum, get_time, to_millis, usize_to_i64, with_connection};
use super::manager::{map_sql_error, DbManager};

pub struct SqliteCallRepository {
    db: Arc<DbManager>,
}

impl SqliteCallRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Import one call record. Returns the stored id.
    pub async fn insert(&self, call: &CallRecord) -> DomainResult<i64> {
        let call = call.clone();
        with_connection(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO calls
                    (src, dst, src_norm, dst_norm, started_at, duration_secs, direction)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    call.src,
                    call.dst,
                    digits_only(&call.src),
                    digits_only(&call.dst),
                    to_millis(call.started_at),
                    call.duration_secs,
                    call.direction.as_str(),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }
}

/// `WHERE` clause matching any tail on either side, plus its parameters.
fn tail_clause(filter: &CallFilter) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();
    for (index, tail) in filter.tails().enumerate() {
        let n = index + 1;
        clauses.push(format!(
            "(src_norm LIKE '%' || ?{n} || '%' OR dst_norm LIKE '%' || ?{n} || '%')"
        ));
        values.push(Value::Text(tail.to_string()));
    }
    (clauses.join(" OR "), values)
}

#[async_trait]
impl CallRepository for SqliteCallRepository {
    async fn count_matching(&self, filter: &CallFilter) -> DomainResult<u64> {
        if filter.is_empty() {
            return Ok(0);
        }
        let (clause, values) = tail_clause(filter);
        with_connection(&self.db, move |conn| {
            let count: i64 = conn
                .query_row(
                    &format!("SELECT COUNT(*) FROM calls WHERE {clause}"),
                    params_from_iter(values),
                    |row| row.get(0),
                )
                .map_err(map_sql_error)?;
            Ok(count.max(0) as u64)
        })
        .await
    }

    async fn list_matching(&self, filter: &CallFilter, limit: usize) -> DomainResult<Vec<CallRecord>> {
        if filter.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let (clause, mut values) = tail_clause(filter);
        let limit_index = values.len() + 1;
        values.push(Value::Integer(usize_to_i64(limit)));
        with_connection(&self.db, move |conn| {
            let sql = format!(
                "SELECT id, src, dst, started_at, duration_secs, direction
                 FROM calls WHERE {clause}
                 ORDER BY started_at DESC, id DESC
                 LIMIT ?{limit_index}"
            );
            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params_from_iter(values), |row| {
                    Ok(CallRecord {
                        id: row.get("id")?,
                        src: row.get("src")?,
                        dst: row.get("dst")?,
                        started_at: get_time(row, "started_at")?,
                        duration_secs: row.get("duration_secs")?,
                        direction: get_enum(row, "direction")?,
                    })
                })
                .map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn clause_numbers_parameters_per_tail() {
        let tails: BTreeSet<String> = ["1234567".to_string(), "7654321".to_string()].into();
        let (clause, values) = tail_clause(&CallFilter::new(tails));
        assert!(clause.contains("?1"));
        assert!(clause.contains("?2"));
        assert_eq!(clause.matches(" OR ").count(), 3);
        assert_eq!(values.len(), 2);
    }
}
