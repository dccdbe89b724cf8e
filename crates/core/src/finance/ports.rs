//! Port interfaces for finance records

use std::collections::HashMap;

use async_trait::async_trait;
use leadflow_domain::{FinanceKind, FinanceRecord, FinanceSummary, NewFinanceRecord, Result};

#[async_trait]
pub trait FinanceRepository: Send + Sync {
    async fn insert(&self, record: &NewFinanceRecord) -> Result<FinanceRecord>;

    async fn list_for_lead(&self, lead_id: i64) -> Result<Vec<FinanceRecord>>;

    /// Count and signed-amount sum grouped by lead. Leads without records are
    /// absent from the map.
    async fn summarize(&self, lead_ids: &[i64]) -> Result<HashMap<i64, FinanceSummary>>;

    async fn has_record(&self, lead_id: i64, kind: FinanceKind) -> Result<bool>;
}
