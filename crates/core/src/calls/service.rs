//! Call correlation service

use std::sync::Arc;

use leadflow_domain::{CallFilter, CallRecord, Lead, Result};
use tracing::warn;

use super::ports::CallRepository;

pub struct CallService {
    calls: Arc<dyn CallRepository>,
}

impl CallService {
    pub fn new(calls: Arc<dyn CallRepository>) -> Self {
        Self { calls }
    }

    /// Number of calls matching the lead's phone tails.
    ///
    /// Lookup errors are logged and reported as zero so a counter never
    /// breaks the lead view.
    pub async fn call_count(&self, lead: &Lead) -> u64 {
        let filter = CallFilter::for_lead(lead);
        if filter.is_empty() {
            return 0;
        }
        match self.calls.count_matching(&filter).await {
            Ok(count) => count,
            Err(err) => {
                warn!(lead_id = lead.id, error = %err, "call count lookup failed");
                0
            }
        }
    }

    /// Calls matching the lead's phone tails, newest first.
    pub async fn calls_for_lead(&self, lead: &Lead, limit: usize) -> Result<Vec<CallRecord>> {
        let filter = CallFilter::for_lead(lead);
        if filter.is_empty() {
            return Ok(Vec::new());
        }
        self.calls.list_matching(&filter, limit).await
    }
}
