//! Spare-part movements

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveType {
    In,
    Out,
}

impl_domain_status_conversions!(MoveType {
    In => "in",
    Out => "out",
});

/// Part taken from (`out`) or returned to (`in`) stock for a lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartMove {
    pub id: i64,
    pub lead_id: i64,
    pub move_type: MoveType,
    pub part_name: String,
    pub quantity: f64,
}
