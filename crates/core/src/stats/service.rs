//! Stage and technician counters

use std::sync::Arc;

use leadflow_domain::constants::TRACKED_STAGE_TITLES;
use leadflow_domain::{MoveType, Result, StageCount, TechnicianStats};

use crate::lead::ports::{LeadRepository, StageRepository};
use crate::product::ports::PartMoveRepository;

pub struct StatsService {
    leads: Arc<dyn LeadRepository>,
    stages: Arc<dyn StageRepository>,
    parts: Arc<dyn PartMoveRepository>,
}

impl StatsService {
    pub fn new(
        leads: Arc<dyn LeadRepository>,
        stages: Arc<dyn StageRepository>,
        parts: Arc<dyn PartMoveRepository>,
    ) -> Self {
        Self { leads, stages, parts }
    }

    /// Lead count for every stage in pipeline order, with `Name (N)` labels.
    pub async fn stage_counts(&self) -> Result<Vec<StageCount>> {
        let counts = self.leads.count_by_stage().await?;
        Ok(self
            .stages
            .list()
            .await?
            .into_iter()
            .map(|stage| {
                let count = counts.get(&stage.id).copied().unwrap_or(0);
                StageCount {
                    stage_id: stage.id,
                    label: stage.display_with_count(count),
                    name: stage.name,
                    count,
                }
            })
            .collect())
    }

    /// Active/done totals and per-title counts over a technician's active
    /// leads. Titles without a matching stage count as zero.
    pub async fn technician_stats(&self, employee_id: i64) -> Result<TechnicianStats> {
        let stages = self.stages.list().await?;

        let (won, open): (Vec<_>, Vec<_>) = stages.iter().partition(|s| s.is_won);
        let won_ids: Vec<i64> = won.iter().map(|s| s.id).collect();
        let open_ids: Vec<i64> = open.iter().map(|s| s.id).collect();

        let active = self.count(employee_id, &open_ids).await?;
        let done = self.count(employee_id, &won_ids).await?;

        let mut per_stage = Vec::with_capacity(TRACKED_STAGE_TITLES.len());
        for title in TRACKED_STAGE_TITLES {
            let ids: Vec<i64> = stages.iter().filter(|s| s.name == title).map(|s| s.id).collect();
            per_stage.push((title.to_string(), self.count(employee_id, &ids).await?));
        }

        Ok(TechnicianStats { employee_id, active, done, per_stage })
    }

    /// Spare parts taken out of stock for the lead.
    pub async fn used_parts_count(&self, lead_id: i64) -> Result<u64> {
        self.parts.count_by_type(lead_id, MoveType::Out).await
    }

    async fn count(&self, employee_id: i64, stage_ids: &[i64]) -> Result<u64> {
        if stage_ids.is_empty() {
            return Ok(0);
        }
        self.leads.count_for_technician(employee_id, stage_ids).await
    }
}
