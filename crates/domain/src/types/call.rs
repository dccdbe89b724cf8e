//! PBX call records and phone-tail filtering

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;
use crate::types::lead::Lead;
use crate::utils::phone::{digits_only, phone_tails};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallDirection {
    Inbound,
    Outbound,
    Internal,
}

impl_domain_status_conversions!(CallDirection {
    Inbound => "inbound",
    Outbound => "outbound",
    Internal => "internal",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    #[serde(default)]
    pub id: i64,
    pub src: String,
    pub dst: String,
    pub started_at: DateTime<Utc>,
    pub duration_secs: i64,
    pub direction: CallDirection,
}

/// Matches calls whose source or destination contains one of the tails.
///
/// An empty filter matches nothing. Unrelated numbers sharing a seven-digit
/// suffix will match as well.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallFilter {
    tails: BTreeSet<String>,
}

impl CallFilter {
    pub fn new(tails: BTreeSet<String>) -> Self {
        Self { tails }
    }

    /// Tails of the lead's and its contact's phone numbers.
    pub fn for_lead(lead: &Lead) -> Self {
        Self::new(phone_tails(lead.phone_numbers()))
    }

    pub fn is_empty(&self) -> bool {
        self.tails.is_empty()
    }

    pub fn tails(&self) -> impl Iterator<Item = &str> {
        self.tails.iter().map(String::as_str)
    }

    pub fn matches(&self, call: &CallRecord) -> bool {
        let src = digits_only(&call.src);
        let dst = digits_only(&call.dst);
        self.tails.iter().any(|tail| src.contains(tail.as_str()) || dst.contains(tail.as_str()))
    }
}
