//! Product service

use std::sync::Arc;

use leadflow_domain::{
    product_total, Lead, LeadflowError, NewProductLine, OperationContext, ProductLine,
    ProductWork, Result, TelegramOrigin, WorkState,
};
use tracing::info;

use super::ports::{ProductLineRepository, ProductWorkRepository};
use crate::lead::ports::LeadRepository;

const LEAD_NOT_FOUND: &str = "Zayavka topilmadi.";

pub struct ProductService {
    lines: Arc<dyn ProductLineRepository>,
    works: Arc<dyn ProductWorkRepository>,
    leads: Arc<dyn LeadRepository>,
}

impl ProductService {
    pub fn new(
        lines: Arc<dyn ProductLineRepository>,
        works: Arc<dyn ProductWorkRepository>,
        leads: Arc<dyn LeadRepository>,
    ) -> Self {
        Self { lines, works, leads }
    }

    pub async fn lines(&self, lead_id: i64) -> Result<Vec<ProductLine>> {
        self.lines.list_for_lead(lead_id).await
    }

    /// Sum of the lead's line subtotals.
    pub async fn total(&self, lead_id: i64) -> Result<f64> {
        Ok(product_total(&self.lines.list_for_lead(lead_id).await?))
    }

    pub async fn add_line(&self, line: NewProductLine) -> Result<ProductLine> {
        self.ensure_lead(line.lead_id).await?;
        if line.quantity <= 0.0 {
            return Err(LeadflowError::InvalidInput("Quantity must be positive".into()));
        }
        self.lines.insert(&line).await
    }

    /// Add a line defaulted from a synced sale record.
    pub async fn add_from_sale(&self, lead_id: i64, sale_id: i64) -> Result<ProductLine> {
        let sale = self
            .lines
            .find_sale(sale_id)
            .await?
            .ok_or_else(|| LeadflowError::NotFound(format!("Sale record {sale_id}")))?;
        self.add_line(NewProductLine::from_sale(lead_id, &sale)).await
    }

    /// Record that the technician took the product away.
    pub async fn create_take(
        &self,
        ctx: &OperationContext,
        lead_id: i64,
        usta_id: i64,
        origin: TelegramOrigin,
        note: Option<String>,
    ) -> Result<ProductWork> {
        self.record_work(ctx, lead_id, usta_id, WorkState::Take, origin, note).await
    }

    /// Record that the technician brought the product back.
    pub async fn create_return(
        &self,
        ctx: &OperationContext,
        lead_id: i64,
        usta_id: i64,
        origin: TelegramOrigin,
        note: Option<String>,
    ) -> Result<ProductWork> {
        self.record_work(ctx, lead_id, usta_id, WorkState::Return, origin, note).await
    }

    /// Latest take/return state of a technician on a lead.
    pub async fn latest_state(&self, lead_id: i64, usta_id: i64) -> Result<Option<WorkState>> {
        Ok(self.works.latest(lead_id, Some(usta_id)).await?.map(|w| w.state))
    }

    /// State shown on the lead: latest record of the assigned technician,
    /// falling back to the latest record of anyone. Logs when the value
    /// differs from `previous`.
    pub async fn derived_state(
        &self,
        lead: &Lead,
        previous: Option<WorkState>,
    ) -> Result<Option<WorkState>> {
        let mut latest = self.works.latest(lead.id, lead.usta_id).await?;
        if latest.is_none() && lead.usta_id.is_some() {
            latest = self.works.latest(lead.id, None).await?;
        }
        let state = latest.map(|w| w.state);

        if state != previous {
            info!(
                lead_id = lead.id,
                service_number = ?lead.service_number,
                usta_id = ?lead.usta_id,
                old = ?previous,
                new = ?state,
                "product work state changed"
            );
        }
        Ok(state)
    }

    async fn record_work(
        &self,
        ctx: &OperationContext,
        lead_id: i64,
        usta_id: i64,
        state: WorkState,
        origin: TelegramOrigin,
        note: Option<String>,
    ) -> Result<ProductWork> {
        self.ensure_lead(lead_id).await?;
        let work = ProductWork {
            id: 0,
            lead_id,
            usta_id,
            state,
            note: note.unwrap_or_default(),
            tg_user_id: origin.user_id.unwrap_or_default(),
            tg_chat_id: origin.chat_id.unwrap_or_default(),
            tg_message_id: origin.message_id.unwrap_or_default(),
            created_at: ctx.now,
        };
        self.works.insert(&work).await
    }

    async fn ensure_lead(&self, lead_id: i64) -> Result<()> {
        if self.leads.exists(lead_id).await? {
            Ok(())
        } else {
            Err(LeadflowError::NotFound(LEAD_NOT_FOUND.into()))
        }
    }
}
