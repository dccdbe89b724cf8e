//! Lead commands

use chrono::Utc;
use leadflow_core::{LeadOverview, LeadRepository};
use leadflow_domain::{
    CallRecord, FinanceSummary, Lead, LeadUpdate, LeadflowError, NewLead, Result, StageCount,
    TechnicianStats,
};
use serde::Serialize;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_logged;

/// Everything shown on a lead card.
#[derive(Debug, Clone, Serialize)]
pub struct LeadCard {
    pub lead: Lead,
    pub overview: LeadOverview,
    pub finance: FinanceSummary,
    pub product_total: f64,
    pub used_parts: u64,
    pub call_count: u64,
}

pub async fn create_lead(ctx: &AppContext, new: NewLead, actor: Option<&str>) -> Result<Lead> {
    execute_logged("leads::create", || async {
        let op = ctx.operation_context(actor);
        ctx.pipeline.create(&op, new).await
    })
    .await
}

pub async fn update_lead(
    ctx: &AppContext,
    lead_id: i64,
    update: LeadUpdate,
    actor: Option<&str>,
) -> Result<Lead> {
    execute_logged("leads::update", || async {
        let op = ctx.operation_context(actor);
        ctx.pipeline.write(&op, lead_id, update).await
    })
    .await
}

pub async fn lead_card(ctx: &AppContext, lead_id: i64) -> Result<LeadCard> {
    execute_logged("leads::card", || async {
        let lead = ctx
            .leads
            .find_by_id(lead_id)
            .await?
            .ok_or_else(|| LeadflowError::NotFound(format!("Lead {lead_id}")))?;
        let overview = ctx.insights.overview(lead_id, Utc::now()).await?;
        let finance = ctx.finance.summary(lead_id).await?;
        let product_total = ctx.products.total(lead_id).await?;
        let used_parts = ctx.stats.used_parts_count(lead_id).await?;
        let call_count = ctx.calls.call_count(&lead).await;
        Ok(LeadCard { lead, overview, finance, product_total, used_parts, call_count })
    })
    .await
}

pub async fn lead_calls(ctx: &AppContext, lead_id: i64, limit: usize) -> Result<Vec<CallRecord>> {
    execute_logged("leads::calls", || async {
        let lead = ctx
            .leads
            .find_by_id(lead_id)
            .await?
            .ok_or_else(|| LeadflowError::NotFound(format!("Lead {lead_id}")))?;
        ctx.calls.calls_for_lead(&lead, limit).await
    })
    .await
}

pub async fn stage_counts(ctx: &AppContext) -> Result<Vec<StageCount>> {
    execute_logged("leads::stage_counts", || ctx.stats.stage_counts()).await
}

pub async fn technician_stats(ctx: &AppContext, employee_id: i64) -> Result<TechnicianStats> {
    execute_logged("leads::technician_stats", || ctx.stats.technician_stats(employee_id)).await
}
