//! Dashboard counters

use serde::{Deserialize, Serialize};

/// Lead count for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCount {
    pub stage_id: i64,
    pub name: String,
    pub count: u64,
    /// `Name (N)` header label.
    pub label: String,
}

/// Per-technician counters over active leads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicianStats {
    pub employee_id: i64,
    /// Leads in a non-won stage.
    pub active: u64,
    /// Leads in a won stage.
    pub done: u64,
    /// `(stage title, count)` in pipeline order.
    pub per_stage: Vec<(String, u64)>,
}

impl TechnicianStats {
    pub fn count_for(&self, title: &str) -> u64 {
        self.per_stage.iter().find(|(t, _)| t == title).map_or(0, |(_, c)| *c)
    }
}
