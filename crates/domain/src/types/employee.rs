//! Employees (technicians)

use serde::{Deserialize, Serialize};

/// Field technician or office employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    /// Field technician ("usta").
    pub is_usta: bool,
    pub active: bool,
    /// Districts the technician serves.
    #[serde(default)]
    pub service_region_ids: Vec<i64>,
    /// Provinces the technician serves.
    #[serde(default)]
    pub state_ids: Vec<i64>,
    pub tg_chat_id: Option<String>,
}

impl Employee {
    pub fn serves_region(&self, region_id: i64) -> bool {
        self.service_region_ids.contains(&region_id)
    }

    pub fn serves_state(&self, state_id: i64) -> bool {
        self.state_ids.contains(&state_id)
    }

    /// Non-blank Telegram chat id.
    pub fn telegram_chat(&self) -> Option<&str> {
        self.tg_chat_id.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}
