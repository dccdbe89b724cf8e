//! SQLite pool helpers
//!
//! Thin wrapper around `r2d2_sqlite` that applies the connection pragmas and
//! converts pool errors into the domain error type.

use std::path::Path;
use std::time::Duration;

use leadflow_domain::{LeadflowError, Result as DomainResult};
use r2d2_sqlite::SqliteConnectionManager;

use crate::errors::InfraError;

pub type SqlitePool = r2d2::Pool<SqliteConnectionManager>;
pub type SqliteConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a pool of at most `max_size` connections to the database at `path`.
pub fn create_sqlite_pool<P: AsRef<Path>>(path: P, max_size: u32) -> DomainResult<SqlitePool> {
    let manager = SqliteConnectionManager::file(path.as_ref()).with_init(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", true)
    });

    r2d2::Pool::builder()
        .max_size(max_size.max(1))
        .connection_timeout(Duration::from_secs(10))
        .build(manager)
        .map_err(|err| LeadflowError::from(InfraError::from(err)))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn create_pool_successfully() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let pool = create_sqlite_pool(&db_path, 2).expect("pool should be created");

        let conn = pool.get().expect("connection should be acquired");
        conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY)", rusqlite::params![])
            .expect("table creation should succeed");
        let fk: i64 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)).unwrap();
        assert_eq!(fk, 1);
    }
}
