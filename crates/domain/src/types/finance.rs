//! Finance records linked to leads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinanceKind {
    Bonus,
    Payment,
    Expense,
}

impl_domain_status_conversions!(FinanceKind {
    Bonus => "bonus",
    Payment => "payment",
    Expense => "expense",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinanceDirection {
    In,
    Out,
}

impl_domain_status_conversions!(FinanceDirection {
    In => "in",
    Out => "out",
});

impl FinanceDirection {
    /// Apply the direction sign to an absolute amount.
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            Self::In => amount.abs(),
            Self::Out => -amount.abs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceRecord {
    pub id: i64,
    pub lead_id: i64,
    pub employee_id: Option<i64>,
    pub kind: FinanceKind,
    pub direction: FinanceDirection,
    pub amount: f64,
    pub signed_amount: f64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Unsaved finance record; the signed amount is derived on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFinanceRecord {
    pub lead_id: i64,
    pub employee_id: Option<i64>,
    pub kind: FinanceKind,
    pub direction: FinanceDirection,
    pub amount: f64,
    pub note: Option<String>,
}

impl NewFinanceRecord {
    pub fn signed_amount(&self) -> f64 {
        self.direction.signed(self.amount)
    }
}

/// Per-lead aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FinanceSummary {
    pub count: u64,
    pub amount_sum: f64,
}
