//! Lead create/write pipeline
//!
//! Every create and write runs the same ordered list of [`PipelineStep`]s.
//! Steps before `persist` may reject the operation (validation, missing
//! service-number counter) and leave storage untouched. Steps after it only
//! enrich: their failures are logged and never undo the write.

use std::sync::Arc;

use leadflow_domain::{
    extract_coordinates, impl_domain_status_conversions, Lead, LeadUpdate, LeadflowError, NewLead,
    NotificationKind, OperationContext, Result, Stage, StageChangeEvent, StageConfig,
};
use tracing::{debug, info, warn};

use super::assignment::{region_first_warning, validate_assignment};
use super::numbering::ServiceNumberIssuer;
use super::ports::{EmployeeRepository, LeadRepository, StageHistoryRepository, StageRepository};
use super::stamping::stamp_stage_entry;
use crate::finance::FinanceService;
use crate::notification::{due_notifications, NotificationService, NotificationSnapshot};

/// Named steps in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    ValidateAssignment,
    ResolveCoordinates,
    StampLifecycle,
    AssignServiceNumber,
    Persist,
    RecordHistory,
    PostNotes,
    Notify,
    AwardBonus,
}

impl_domain_status_conversions!(PipelineStep {
    ValidateAssignment => "validate_assignment",
    ResolveCoordinates => "resolve_coordinates",
    StampLifecycle => "stamp_lifecycle",
    AssignServiceNumber => "assign_service_number",
    Persist => "persist",
    RecordHistory => "record_history",
    PostNotes => "post_notes",
    Notify => "notify",
    AwardBonus => "award_bonus",
});

pub const PIPELINE: [PipelineStep; 9] = [
    PipelineStep::ValidateAssignment,
    PipelineStep::ResolveCoordinates,
    PipelineStep::StampLifecycle,
    PipelineStep::AssignServiceNumber,
    PipelineStep::Persist,
    PipelineStep::RecordHistory,
    PipelineStep::PostNotes,
    PipelineStep::Notify,
    PipelineStep::AwardBonus,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Create,
    Write,
}

/// Working state threaded through the steps.
struct Draft {
    operation: Operation,
    lead: Lead,
    stage: Option<Stage>,
    stage_changed: bool,
    assignment_changed: bool,
    geo_changed: bool,
    before: NotificationSnapshot,
    notes: Vec<String>,
}

pub struct LeadPipeline {
    leads: Arc<dyn LeadRepository>,
    stages: Arc<dyn StageRepository>,
    employees: Arc<dyn EmployeeRepository>,
    history: Arc<dyn StageHistoryRepository>,
    numbering: ServiceNumberIssuer,
    notifications: Arc<NotificationService>,
    finance: Option<Arc<FinanceService>>,
    stage_config: StageConfig,
}

impl LeadPipeline {
    pub fn new(
        leads: Arc<dyn LeadRepository>,
        stages: Arc<dyn StageRepository>,
        employees: Arc<dyn EmployeeRepository>,
        history: Arc<dyn StageHistoryRepository>,
        numbering: ServiceNumberIssuer,
        notifications: Arc<NotificationService>,
        stage_config: StageConfig,
    ) -> Self {
        Self {
            leads,
            stages,
            employees,
            history,
            numbering,
            notifications,
            finance: None,
            stage_config,
        }
    }

    /// Enable technician bonuses on won transitions.
    pub fn with_finance(mut self, finance: Arc<FinanceService>) -> Self {
        self.finance = Some(finance);
        self
    }

    /// Create a lead.
    pub async fn create(&self, ctx: &OperationContext, new: NewLead) -> Result<Lead> {
        let stage = self.load_stage(new.stage_id).await?;
        let lead = new.into_lead(ctx.company_id, ctx.now);
        let draft = Draft {
            operation: Operation::Create,
            stage_changed: stage.is_some(),
            assignment_changed: lead.usta_id.is_some() || lead.region_id.is_some(),
            geo_changed: lead.geo_link.is_some(),
            // A new lead starts from "not new, not won".
            before: NotificationSnapshot::default(),
            notes: Vec::new(),
            lead,
            stage,
        };
        self.run(ctx, draft).await
    }

    /// Apply `update` to an existing lead.
    pub async fn write(&self, ctx: &OperationContext, lead_id: i64, update: LeadUpdate) -> Result<Lead> {
        let current = self
            .leads
            .find_by_id(lead_id)
            .await?
            .ok_or_else(|| LeadflowError::NotFound(format!("Lead {lead_id}")))?;
        let current_stage = self.load_stage(current.stage_id).await?;
        let before = NotificationSnapshot::capture(&current, current_stage.as_ref(), &self.stage_config);

        let stage_changed = update.changes_stage(&current);
        let geo_changed = update.changes_geo_link(&current);
        let assignment_changed = update.usta_id.is_some_and(|u| u != current.usta_id)
            || update.region_id.is_some_and(|r| r != current.region_id);

        let mut lead = current;
        update.apply(&mut lead);
        lead.updated_at = ctx.now;

        let stage = if stage_changed { self.load_stage(lead.stage_id).await? } else { current_stage };

        let draft = Draft {
            operation: Operation::Write,
            lead,
            stage,
            stage_changed,
            assignment_changed,
            geo_changed,
            before,
            notes: Vec::new(),
        };
        self.run(ctx, draft).await
    }

    /// Assign service numbers to `servis` leads created without one.
    pub async fn backfill_service_numbers(&self) -> Result<usize> {
        self.numbering.backfill(self.leads.as_ref()).await
    }

    async fn run(&self, ctx: &OperationContext, mut draft: Draft) -> Result<Lead> {
        for step in PIPELINE {
            debug!(step = %step, lead_id = draft.lead.id, "running lead pipeline step");
            self.run_step(step, ctx, &mut draft).await?;
        }
        Ok(draft.lead)
    }

    async fn run_step(&self, step: PipelineStep, ctx: &OperationContext, draft: &mut Draft) -> Result<()> {
        match step {
            PipelineStep::ValidateAssignment => self.validate_assignment(draft).await,
            PipelineStep::ResolveCoordinates => {
                resolve_coordinates(draft);
                Ok(())
            }
            PipelineStep::StampLifecycle => {
                if draft.stage_changed {
                    if let Some(stage) = &draft.stage {
                        stamp_stage_entry(&mut draft.lead, stage, ctx.now);
                    }
                }
                Ok(())
            }
            PipelineStep::AssignServiceNumber => {
                if !draft.lead.has_service_number() {
                    let number = self.numbering.issue(draft.lead.company_id).await?;
                    draft.lead.service_number = Some(number);
                }
                Ok(())
            }
            PipelineStep::Persist => self.persist(draft).await,
            PipelineStep::RecordHistory => {
                self.record_history(ctx, draft).await;
                Ok(())
            }
            PipelineStep::PostNotes => {
                self.post_notes(draft).await;
                Ok(())
            }
            PipelineStep::Notify => {
                self.notify(ctx, draft).await;
                Ok(())
            }
            PipelineStep::AwardBonus => {
                self.award_bonus(draft).await;
                Ok(())
            }
        }
    }

    async fn validate_assignment(&self, draft: &Draft) -> Result<()> {
        if !draft.assignment_changed {
            return Ok(());
        }
        if let Some(warning) = region_first_warning(&draft.lead) {
            warn!(lead_id = draft.lead.id, warning, "technician selected without region");
        }
        let (Some(usta_id), Some(_)) = (draft.lead.usta_id, draft.lead.region_id) else {
            return Ok(());
        };
        let technician = self
            .employees
            .find_by_id(usta_id)
            .await?
            .ok_or_else(|| LeadflowError::NotFound(format!("Technician {usta_id}")))?;
        validate_assignment(&draft.lead, &technician)
    }

    async fn persist(&self, draft: &mut Draft) -> Result<()> {
        match draft.operation {
            Operation::Create => {
                let inserted = self.leads.insert(draft.lead.clone()).await?;
                info!(
                    lead_id = inserted.id,
                    service_number = ?inserted.service_number,
                    "lead created"
                );
                draft.lead = inserted;
            }
            Operation::Write => {
                self.leads.update(&draft.lead).await?;
                debug!(lead_id = draft.lead.id, stage_changed = draft.stage_changed, "lead updated");
            }
        }
        Ok(())
    }

    async fn record_history(&self, ctx: &OperationContext, draft: &Draft) {
        if !draft.stage_changed {
            return;
        }
        let Some(stage) = &draft.stage else {
            return;
        };
        let event = StageChangeEvent::for_stage(draft.lead.id, stage, ctx.now);
        if let Err(err) = self.history.record(&event).await {
            warn!(lead_id = draft.lead.id, error = %err, "failed to record stage change");
        }
    }

    async fn post_notes(&self, draft: &mut Draft) {
        for body in draft.notes.drain(..) {
            if let Err(err) = self.leads.post_note(draft.lead.id, &body).await {
                warn!(lead_id = draft.lead.id, error = %err, "failed to post lead note");
            }
        }
    }

    async fn notify(&self, ctx: &OperationContext, draft: &mut Draft) {
        let after =
            NotificationSnapshot::capture(&draft.lead, draft.stage.as_ref(), &self.stage_config);
        for kind in due_notifications(&draft.lead, draft.before, after) {
            self.notifications.notify(ctx, &draft.lead, kind).await;
            match kind {
                NotificationKind::NewRequest => draft.lead.notify_new_sent = true,
                NotificationKind::Won => draft.lead.notify_won_sent = true,
            }
        }
    }

    async fn award_bonus(&self, draft: &Draft) {
        let Some(finance) = &self.finance else {
            return;
        };
        let is_won = draft.lead.is_won(draft.stage.as_ref());
        if !is_won || draft.before.is_won {
            return;
        }
        if let Err(err) = finance.award_bonus(&draft.lead).await {
            warn!(lead_id = draft.lead.id, error = %err, "failed to record technician bonus");
        }
    }

    async fn load_stage(&self, stage_id: Option<i64>) -> Result<Option<Stage>> {
        let Some(id) = stage_id else {
            return Ok(None);
        };
        self.stages
            .find_by_id(id)
            .await?
            .map(Some)
            .ok_or_else(|| LeadflowError::NotFound(format!("Stage {id}")))
    }
}

/// Parse the map link into coordinates; an unparsable link becomes a note.
fn resolve_coordinates(draft: &mut Draft) {
    if !draft.geo_changed {
        return;
    }
    let link = draft.lead.geo_link.as_deref().map(str::trim).filter(|l| !l.is_empty());
    let Some(link) = link else {
        draft.lead.geo_lat = None;
        draft.lead.geo_lng = None;
        return;
    };
    match extract_coordinates(link) {
        Some(coords) => {
            draft.lead.geo_lat = Some(coords.lat);
            draft.lead.geo_lng = Some(coords.lng);
        }
        None => {
            debug!(lead_id = draft.lead.id, link, "no coordinates in map link");
            draft.notes.push(format!("Xarita havolasidan koordinatalar aniqlanmadi: {link}"));
        }
    }
}
