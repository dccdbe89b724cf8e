//! Helpers shared by the SQLite repositories

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use leadflow_domain::{LeadflowError, Result};
use rusqlite::types::Type;
use rusqlite::Row;
use tokio::task;

use super::manager::DbManager;
use super::pool::SqliteConnection;

/// Run `f` on a pooled connection inside `spawn_blocking`.
pub(crate) async fn with_connection<T, F>(db: &Arc<DbManager>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
{
    let db = Arc::clone(db);
    task::spawn_blocking(move || {
        let mut conn = db.get_connection()?;
        f(&mut conn)
    })
    .await
    .map_err(map_join_error)?
}

pub(crate) fn map_join_error(err: task::JoinError) -> LeadflowError {
    if err.is_cancelled() {
        LeadflowError::Internal("database task cancelled".into())
    } else {
        LeadflowError::Internal(format!("database task panic: {err}"))
    }
}

/// Timestamps are stored as Unix milliseconds.
pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn opt_millis(at: Option<DateTime<Utc>>) -> Option<i64> {
    at.map(to_millis)
}

pub(crate) fn get_time(row: &Row<'_>, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(column)?;
    DateTime::from_timestamp_millis(millis).ok_or_else(|| out_of_range(column, millis))
}

pub(crate) fn get_opt_time(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let millis: Option<i64> = row.get(column)?;
    millis
        .map(|m| DateTime::from_timestamp_millis(m).ok_or_else(|| out_of_range(column, m)))
        .transpose()
}

/// Parse a selection column stored as text.
pub(crate) fn get_enum<T>(row: &Row<'_>, column: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.get(column)?;
    raw.parse().map_err(|err: String| conversion_error(column, err))
}

pub(crate) fn get_opt_enum<T>(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<T>>
where
    T: FromStr<Err = String>,
{
    let raw: Option<String> = row.get(column)?;
    raw.filter(|r| !r.trim().is_empty())
        .map(|r| r.parse().map_err(|err: String| conversion_error(column, err)))
        .transpose()
}

pub(crate) fn usize_to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// `?n, ?n+1, ...` placeholders for an `IN (...)` list starting at `first`.
pub(crate) fn placeholders(first: usize, count: usize) -> String {
    (first..first + count).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ")
}

fn out_of_range(column: &str, value: i64) -> rusqlite::Error {
    conversion_error(column, format!("timestamp out of range: {value}"))
}

fn conversion_error(column: &str, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, format!("{column}: {message}").into())
}
