//! Finance service

use std::collections::HashMap;
use std::sync::Arc;

use leadflow_domain::{
    FinanceConfig, FinanceDirection, FinanceKind, FinanceRecord, FinanceSummary, Lead,
    NewFinanceRecord, Result,
};
use tracing::{debug, info};

use super::ports::FinanceRepository;

pub struct FinanceService {
    repository: Arc<dyn FinanceRepository>,
    config: FinanceConfig,
}

impl FinanceService {
    pub fn new(repository: Arc<dyn FinanceRepository>, config: FinanceConfig) -> Self {
        Self { repository, config }
    }

    /// Summary for each requested lead; leads without records get zeros.
    pub async fn summaries(&self, lead_ids: &[i64]) -> Result<HashMap<i64, FinanceSummary>> {
        if lead_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let found = self.repository.summarize(lead_ids).await?;
        Ok(lead_ids
            .iter()
            .map(|id| (*id, found.get(id).copied().unwrap_or_default()))
            .collect())
    }

    pub async fn summary(&self, lead_id: i64) -> Result<FinanceSummary> {
        Ok(self.summaries(&[lead_id]).await?.remove(&lead_id).unwrap_or_default())
    }

    pub async fn records(&self, lead_id: i64) -> Result<Vec<FinanceRecord>> {
        self.repository.list_for_lead(lead_id).await
    }

    pub async fn record(&self, record: NewFinanceRecord) -> Result<FinanceRecord> {
        self.repository.insert(&record).await
    }

    /// Credit the technician's bonus for a lead that just became won.
    ///
    /// Skipped when bonuses are disabled, the lead has no technician, no
    /// positive work amount, is a repeat request, or already has a bonus.
    pub async fn award_bonus(&self, lead: &Lead) -> Result<Option<FinanceRecord>> {
        if !self.config.bonus_enabled {
            return Ok(None);
        }
        let Some(usta_id) = lead.usta_id else {
            return Ok(None);
        };
        if lead.work_amount <= 0.0 {
            return Ok(None);
        }
        if lead.repeat_request {
            debug!(lead_id = lead.id, "repeat request, no bonus");
            return Ok(None);
        }
        if self.repository.has_record(lead.id, FinanceKind::Bonus).await? {
            return Ok(None);
        }

        let amount = (lead.work_amount * self.config.bonus_percent / 100.0 * 100.0).round() / 100.0;
        let record = self
            .repository
            .insert(&NewFinanceRecord {
                lead_id: lead.id,
                employee_id: Some(usta_id),
                kind: FinanceKind::Bonus,
                direction: FinanceDirection::In,
                amount,
                note: lead.service_number.as_ref().map(|n| format!("Bonus: {n}")),
            })
            .await?;
        info!(lead_id = lead.id, usta_id, amount, "technician bonus recorded");
        Ok(Some(record))
    }
}
