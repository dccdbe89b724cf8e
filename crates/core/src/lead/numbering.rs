//! Service number issuance

use std::sync::Arc;

use leadflow_domain::{LeadCategory, LeadflowError, NumberingConfig, Result};
use tracing::{info, warn};

use super::ports::{LeadRepository, SequenceGenerator};

/// Issues service numbers from the configured counter.
///
/// The company-scoped counter is preferred; the global counter is the
/// fallback. When neither exists the caller gets a blocking
/// [`LeadflowError::Config`] instead of a placeholder number.
pub struct ServiceNumberIssuer {
    sequence: Arc<dyn SequenceGenerator>,
    config: NumberingConfig,
}

impl ServiceNumberIssuer {
    pub fn new(sequence: Arc<dyn SequenceGenerator>, config: NumberingConfig) -> Self {
        Self { sequence, config }
    }

    pub async fn issue(&self, company_id: Option<i64>) -> Result<String> {
        let code = self.config.sequence_code.as_str();

        if self.config.scope_by_company {
            if let Some(company) = company_id {
                if let Some(number) = self.sequence.next_value(code, Some(company)).await? {
                    return Ok(number);
                }
            }
        }

        match self.sequence.next_value(code, None).await? {
            Some(number) => Ok(number),
            None => Err(LeadflowError::Config(format!(
                "Service number sequence '{code}' is not configured"
            ))),
        }
    }

    /// Assign numbers to `servis` leads that were created without one.
    ///
    /// Returns the number of leads updated. Stops at the first failure so a
    /// missing counter is reported instead of silently skipped.
    pub async fn backfill(&self, leads: &dyn LeadRepository) -> Result<usize> {
        let pending = leads.list_missing_service_number(Some(LeadCategory::Servis)).await?;
        if pending.is_empty() {
            return Ok(0);
        }

        let mut assigned = 0;
        for lead in &pending {
            let number = match self.issue(lead.company_id).await {
                Ok(number) => number,
                Err(err) => {
                    warn!(lead_id = lead.id, error = %err, "service number backfill stopped");
                    return Err(err);
                }
            };
            leads.set_service_number(lead.id, &number).await?;
            assigned += 1;
        }

        info!(assigned, "service numbers backfilled");
        Ok(assigned)
    }
}
