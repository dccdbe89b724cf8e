//! Port interfaces for leads, stages and technicians
//!
//! These traits define the boundaries between the lead workflow and the
//! persistence adapters.

use std::collections::HashMap;

use async_trait::async_trait;
use leadflow_domain::{
    Employee, Lead, LeadCategory, LeadNote, NotificationKind, Result, Stage, StageChangeEvent,
};

/// Lead persistence.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Insert a new lead and return it with its assigned id.
    async fn insert(&self, lead: Lead) -> Result<Lead>;

    /// Overwrite every stored field of an existing lead.
    async fn update(&self, lead: &Lead) -> Result<()>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Lead>>;

    async fn exists(&self, id: i64) -> Result<bool>;

    /// Leads without a service number, optionally restricted to a category.
    async fn list_missing_service_number(
        &self,
        category: Option<LeadCategory>,
    ) -> Result<Vec<Lead>>;

    async fn set_service_number(&self, id: i64, number: &str) -> Result<()>;

    /// Set the "already notified" guard flag for `kind`.
    async fn mark_notified(&self, id: i64, kind: NotificationKind) -> Result<()>;

    /// Attach an internal note.
    async fn post_note(&self, lead_id: i64, body: &str) -> Result<LeadNote>;

    async fn list_notes(&self, lead_id: i64) -> Result<Vec<LeadNote>>;

    /// Number of leads per stage id (all leads, active or not).
    async fn count_by_stage(&self) -> Result<HashMap<i64, u64>>;

    /// Active leads of a technician whose stage is one of `stage_ids`.
    async fn count_for_technician(&self, usta_id: i64, stage_ids: &[i64]) -> Result<u64>;
}

/// Pipeline stage lookup.
#[async_trait]
pub trait StageRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Stage>>;

    /// All stages ordered by sequence.
    async fn list(&self) -> Result<Vec<Stage>>;
}

/// Technician lookup.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>>;

    /// Active technicians.
    async fn list_technicians(&self) -> Result<Vec<Employee>>;
}

/// Stage change audit trail.
#[async_trait]
pub trait StageHistoryRepository: Send + Sync {
    async fn record(&self, event: &StageChangeEvent) -> Result<()>;

    /// Events for a lead, oldest first.
    async fn list_for_lead(&self, lead_id: i64) -> Result<Vec<StageChangeEvent>>;
}

/// Monotonic named counters.
#[async_trait]
pub trait SequenceGenerator: Send + Sync {
    /// Next formatted value of the counter `code` for `company_id` (`None`
    /// selects the global counter). `Ok(None)` when no such counter exists.
    async fn next_value(&self, code: &str, company_id: Option<i64>) -> Result<Option<String>>;
}
