//! Maintenance commands: backfill, redelivery, counter setup, health

use chrono::Utc;
use leadflow_core::DeliveryReport;
use leadflow_domain::{LeadflowError, Result};
use tracing::info;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_logged;
use crate::utils::health::HealthStatus;

/// Default number of outbox entries handled per `redeliver` run.
pub const DEFAULT_REDELIVER_LIMIT: usize = 50;

/// Assign service numbers to `servis` leads still missing one.
pub async fn backfill_service_numbers(ctx: &AppContext) -> Result<usize> {
    execute_logged("maintenance::backfill", || async {
        let assigned = ctx.pipeline.backfill_service_numbers().await?;
        info!(assigned, "service number backfill finished");
        Ok(assigned)
    })
    .await
}

/// Deliver notifications left pending, oldest first.
pub async fn redeliver_notifications(ctx: &AppContext, limit: usize) -> Result<DeliveryReport> {
    execute_logged("maintenance::redeliver", || async {
        ctx.notifications.redeliver_pending(limit, Utc::now()).await
    })
    .await
}

/// Parameters for creating or moving the service-number counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceSetup {
    pub company_id: Option<i64>,
    pub prefix: String,
    pub padding: u32,
    pub number_next: Option<i64>,
}

/// Create or reconfigure the service-number counter named in config.
pub async fn configure_sequence(ctx: &AppContext, setup: SequenceSetup) -> Result<()> {
    execute_logged("maintenance::configure_sequence", || async {
        if setup.prefix.trim().is_empty() {
            return Err(LeadflowError::Validation("Sequence prefix is required".into()));
        }
        let code = &ctx.config.numbering.sequence_code;
        ctx.sequences
            .configure(code, setup.company_id, &setup.prefix, setup.padding, setup.number_next)
            .await?;
        info!(code, company_id = ?setup.company_id, prefix = %setup.prefix, "sequence configured");
        Ok(())
    })
    .await
}

pub async fn health(ctx: &AppContext) -> Result<HealthStatus> {
    execute_logged("maintenance::health", || async { Ok(ctx.health_check().await) }).await
}
