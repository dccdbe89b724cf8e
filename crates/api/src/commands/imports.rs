//! JSON imports for reference data and synced records

use std::path::Path;

use leadflow_domain::{CallRecord, Employee, LeadflowError, Result, SaleSyncLine, Stage};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_logged;

/// Read a JSON array of records from `path`.
pub async fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        LeadflowError::InvalidInput(format!("cannot read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        LeadflowError::InvalidInput(format!("invalid JSON in {}: {e}", path.display()))
    })
}

/// Insert or update pipeline stages.
pub async fn import_stages(ctx: &AppContext, path: &Path) -> Result<usize> {
    execute_logged("imports::stages", || async {
        let stages: Vec<Stage> = read_records(path).await?;
        for stage in &stages {
            ctx.stages.save(stage).await?;
        }
        info!(count = stages.len(), "stages imported");
        Ok(stages.len())
    })
    .await
}

/// Insert or update employees with their service areas.
pub async fn import_employees(ctx: &AppContext, path: &Path) -> Result<usize> {
    execute_logged("imports::employees", || async {
        let employees: Vec<Employee> = read_records(path).await?;
        for employee in &employees {
            ctx.employees.save(employee).await?;
        }
        info!(count = employees.len(), "employees imported");
        Ok(employees.len())
    })
    .await
}

/// Append telephony call records.
pub async fn import_calls(ctx: &AppContext, path: &Path) -> Result<usize> {
    execute_logged("imports::calls", || async {
        let calls: Vec<CallRecord> = read_records(path).await?;
        for call in &calls {
            ctx.call_log.insert(call).await?;
        }
        info!(count = calls.len(), "calls imported");
        Ok(calls.len())
    })
    .await
}

/// Store synced sale lines for later use as product-line defaults.
pub async fn import_sales(ctx: &AppContext, path: &Path) -> Result<usize> {
    execute_logged("imports::sales", || async {
        let sales: Vec<SaleSyncLine> = read_records(path).await?;
        for sale in &sales {
            ctx.product_lines.save_sale(sale).await?;
        }
        info!(count = sales.len(), "sale lines imported");
        Ok(sales.len())
    })
    .await
}
