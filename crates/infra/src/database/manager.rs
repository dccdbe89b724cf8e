//! Database connection manager backed by an r2d2 SQLite pool.

use std::path::{Path, PathBuf};

use leadflow_domain::{DatabaseConfig, LeadflowError, Result};
use rusqlite::params;
use tracing::info;

use super::pool::{create_sqlite_pool, SqliteConnection, SqlitePool};
use crate::errors::InfraError;

pub const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Database manager that owns the connection pool.
pub struct DbManager {
    pool: SqlitePool,
    path: PathBuf,
}

impl DbManager {
    /// Create a new manager with the given pool size.
    pub fn new<P: AsRef<Path>>(db_path: P, pool_size: u32) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        let pool = create_sqlite_pool(&path, pool_size)?;

        info!(
            db_path = %path.display(),
            max_connections = pool.max_size(),
            "sqlite pool initialised"
        );

        Ok(Self { pool, path })
    }

    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::new(&config.path, config.pool_size)
    }

    /// Acquire a connection from the pool.
    pub fn get_connection(&self) -> Result<SqliteConnection> {
        self.pool.get().map_err(|err| LeadflowError::from(InfraError::from(err)))
    }

    /// Ensure the full schema exists on the current database.
    pub fn run_migrations(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.execute_batch(SCHEMA_SQL).map_err(map_sql_error)?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, CAST(strftime('%s','now') AS INTEGER))",
            params![SCHEMA_VERSION],
        )
        .map_err(map_sql_error)?;
        info!(version = SCHEMA_VERSION, "database schema up to date");
        Ok(())
    }

    /// Highest applied schema version, `None` before the first migration.
    pub fn schema_version(&self) -> Result<Option<i32>> {
        let conn = self.get_connection()?;
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version')",
                [],
                |row| row.get(0),
            )
            .map_err(map_sql_error)?;
        if !exists {
            return Ok(None);
        }
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .map_err(map_sql_error)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire a connection and run a trivial query.
    pub fn health_check(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0)).map_err(map_sql_error)?;
        Ok(())
    }
}

pub(crate) fn map_sql_error(err: rusqlite::Error) -> LeadflowError {
    LeadflowError::from(InfraError::from(err))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn manager(temp_dir: &TempDir) -> DbManager {
        DbManager::new(temp_dir.path().join("test.db"), 4).expect("manager created")
    }

    #[test]
    fn migrations_create_schema_version() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let manager = manager(&temp_dir);
        assert_eq!(manager.schema_version().unwrap(), None);

        manager.run_migrations().expect("migrations run");
        manager.run_migrations().expect("migrations are idempotent");

        assert_eq!(manager.schema_version().unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn health_check_succeeds_for_valid_database() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let manager = manager(&temp_dir);
        manager.run_migrations().expect("migrations run");

        manager.health_check().expect("health check passed");
    }
}
