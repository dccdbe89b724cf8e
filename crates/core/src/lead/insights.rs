//! Read-side lead metrics: work duration, stage badges, won-button visibility

use std::sync::Arc;

use chrono::{DateTime, Utc};
use leadflow_domain::{
    work_duration, Lead, LeadflowError, LifecycleState, Result, Stage, WorkDuration,
};
use serde::{Deserialize, Serialize};

use super::ports::{LeadRepository, StageHistoryRepository, StageRepository};

/// Computed, display-ready values for one lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadOverview {
    pub lead_id: i64,
    pub stage_state: Option<LifecycleState>,
    pub work_duration: WorkDuration,
    /// `N kun N soat N min`.
    pub work_time_label: String,
    pub stage_elapsed_badge: String,
    pub show_won_button: bool,
}

pub struct LeadInsights {
    leads: Arc<dyn LeadRepository>,
    stages: Arc<dyn StageRepository>,
    history: Arc<dyn StageHistoryRepository>,
}

impl LeadInsights {
    pub fn new(
        leads: Arc<dyn LeadRepository>,
        stages: Arc<dyn StageRepository>,
        history: Arc<dyn StageHistoryRepository>,
    ) -> Self {
        Self { leads, stages, history }
    }

    pub async fn overview(&self, lead_id: i64, now: DateTime<Utc>) -> Result<LeadOverview> {
        let lead = self.load_lead(lead_id).await?;
        let stage = self.load_stage(&lead).await?;
        let duration = self.duration_for(&lead, stage.as_ref(), now).await?;

        Ok(LeadOverview {
            lead_id,
            stage_state: stage.as_ref().and_then(Stage::state),
            work_duration: duration,
            work_time_label: lead.work_time_label(now),
            stage_elapsed_badge: lead.stage_elapsed_badge(now),
            show_won_button: stage.as_ref().is_some_and(Stage::shows_won_button),
        })
    }

    /// Accepted-to-done duration, replaying the audit trail when the stamps
    /// are incomplete.
    pub async fn work_duration(&self, lead_id: i64, now: DateTime<Utc>) -> Result<WorkDuration> {
        let lead = self.load_lead(lead_id).await?;
        let stage = self.load_stage(&lead).await?;
        self.duration_for(&lead, stage.as_ref(), now).await
    }

    async fn duration_for(
        &self,
        lead: &Lead,
        stage: Option<&Stage>,
        now: DateTime<Utc>,
    ) -> Result<WorkDuration> {
        let events = if lead.accepted_at.is_some() && lead.finished_at.is_some() {
            Vec::new()
        } else {
            self.history.list_for_lead(lead.id).await?
        };
        Ok(work_duration(lead, stage, &events, now))
    }

    async fn load_lead(&self, lead_id: i64) -> Result<Lead> {
        self.leads
            .find_by_id(lead_id)
            .await?
            .ok_or_else(|| LeadflowError::NotFound(format!("Lead {lead_id}")))
    }

    async fn load_stage(&self, lead: &Lead) -> Result<Option<Stage>> {
        match lead.stage_id {
            Some(id) => self.stages.find_by_id(id).await,
            None => Ok(None),
        }
    }
}
