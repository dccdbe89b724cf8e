//! SQLite implementation of the employee (technician) port.

use std::sync::Arc;

use async_trait::async_trait;
use leadflow_core::EmployeeRepository;
use leadflow_domain::{Employee, Result as DomainResult};
use rusqlite::{params, Connection, OptionalExtension};

use super::common::with_connection;
use super::manager::{map_sql_error, DbManager};
use super::pool::SqliteConnection;

pub struct SqliteEmployeeRepository {
    db: Arc<DbManager>,
}

impl SqliteEmployeeRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or replace an employee with its served regions and provinces.
    pub async fn save(&self, employee: &Employee) -> DomainResult<()> {
        let employee = employee.clone();
        with_connection(&self.db, move |conn: &mut SqliteConnection| {
            let tx = conn.transaction().map_err(map_sql_error)?;
            tx.execute(
                "INSERT INTO employees (id, name, is_usta, active, tg_chat_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    is_usta = excluded.is_usta,
                    active = excluded.active,
                    tg_chat_id = excluded.tg_chat_id",
                params![employee.id, employee.name, employee.is_usta, employee.active, employee.tg_chat_id],
            )
            .map_err(map_sql_error)?;

            tx.execute("DELETE FROM employee_regions WHERE employee_id = ?1", [employee.id])
                .map_err(map_sql_error)?;
            for region_id in &employee.service_region_ids {
                tx.execute(
                    "INSERT OR IGNORE INTO employee_regions (employee_id, region_id) VALUES (?1, ?2)",
                    params![employee.id, region_id],
                )
                .map_err(map_sql_error)?;
            }

            tx.execute("DELETE FROM employee_states WHERE employee_id = ?1", [employee.id])
                .map_err(map_sql_error)?;
            for state_id in &employee.state_ids {
                tx.execute(
                    "INSERT OR IGNORE INTO employee_states (employee_id, state_id) VALUES (?1, ?2)",
                    params![employee.id, state_id],
                )
                .map_err(map_sql_error)?;
            }

            tx.commit().map_err(map_sql_error)
        })
        .await
    }
}

#[async_trait]
impl EmployeeRepository for SqliteEmployeeRepository {
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Employee>> {
        with_connection(&self.db, move |conn| {
            let employee = conn
                .query_row(
                    "SELECT id, name, is_usta, active, tg_chat_id FROM employees WHERE id = ?1",
                    [id],
                    |row| {
                        Ok(Employee {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            is_usta: row.get(2)?,
                            active: row.get(3)?,
                            service_region_ids: Vec::new(),
                            state_ids: Vec::new(),
                            tg_chat_id: row.get(4)?,
                        })
                    },
                )
                .optional()
                .map_err(map_sql_error)?;
            employee.map(|e| load_areas(conn, e)).transpose()
        })
        .await
    }

    async fn list_technicians(&self) -> DomainResult<Vec<Employee>> {
        with_connection(&self.db, |conn| {
            let employees = {
                let mut stmt = conn
                    .prepare(
                        "SELECT id, name, is_usta, active, tg_chat_id FROM employees
                         WHERE is_usta = 1 AND active = 1 ORDER BY name, id",
                    )
                    .map_err(map_sql_error)?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(Employee {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            is_usta: row.get(2)?,
                            active: row.get(3)?,
                            service_region_ids: Vec::new(),
                            state_ids: Vec::new(),
                            tg_chat_id: row.get(4)?,
                        })
                    })
                    .map_err(map_sql_error)?;
                rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)?
            };
            employees.into_iter().map(|e| load_areas(conn, e)).collect()
        })
        .await
    }
}

fn load_areas(conn: &Connection, mut employee: Employee) -> DomainResult<Employee> {
    employee.service_region_ids = id_list(
        conn,
        "SELECT region_id FROM employee_regions WHERE employee_id = ?1 ORDER BY region_id",
        employee.id,
    )?;
    employee.state_ids = id_list(
        conn,
        "SELECT state_id FROM employee_states WHERE employee_id = ?1 ORDER BY state_id",
        employee.id,
    )?;
    Ok(employee)
}

fn id_list(conn: &Connection, sql: &str, employee_id: i64) -> DomainResult<Vec<i64>> {
    let mut stmt = conn.prepare(sql).map_err(map_sql_error)?;
    let rows = stmt.query_map([employee_id], |row| row.get(0)).map_err(map_sql_error)?;
    rows.collect::<rusqlite::Result<Vec<i64>>>().map_err(map_sql_error)
}
