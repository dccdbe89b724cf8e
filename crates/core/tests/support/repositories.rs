//! In-memory implementations of the persistence ports
//!
//! Each mock keeps its state behind `Arc<Mutex<..>>` so a test can hold a
//! clone for assertions while the service under test owns another.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use leadflow_core::{
    CallRepository, EmployeeRepository, FinanceRepository, LeadRepository, NotificationOutbox,
    PartMoveRepository, ProductLineRepository, ProductWorkRepository, SequenceGenerator,
    StageHistoryRepository, StageRepository,
};
use leadflow_domain::{
    CallFilter, CallRecord, Employee, FinanceKind, FinanceRecord, FinanceSummary, Lead,
    LeadCategory, LeadNote, LeadflowError, MoveType, NewFinanceRecord, NewProductLine,
    NotificationKind, OutboxEntry, OutboxStatus, PartMove, ProductLine, ProductWork,
    Result as DomainResult, SaleSyncLine, Stage, StageChangeEvent,
};

#[derive(Default, Clone)]
pub struct MockLeadRepository {
    leads: Arc<Mutex<BTreeMap<i64, Lead>>>,
    notes: Arc<Mutex<Vec<LeadNote>>>,
}

impl MockLeadRepository {
    pub fn get(&self, id: i64) -> Option<Lead> {
        self.leads.lock().unwrap().get(&id).cloned()
    }

    pub fn count(&self) -> usize {
        self.leads.lock().unwrap().len()
    }

    pub fn notes_for(&self, lead_id: i64) -> Vec<String> {
        self.notes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.lead_id == lead_id)
            .map(|n| n.body.clone())
            .collect()
    }

    /// Store a lead as-is (bypassing the pipeline).
    pub fn seed(&self, mut lead: Lead) -> Lead {
        let mut leads = self.leads.lock().unwrap();
        if lead.id == 0 {
            lead.id = leads.keys().max().copied().unwrap_or(0) + 1;
        }
        leads.insert(lead.id, lead.clone());
        lead
    }
}

#[async_trait]
impl LeadRepository for MockLeadRepository {
    async fn insert(&self, lead: Lead) -> DomainResult<Lead> {
        let mut leads = self.leads.lock().unwrap();
        if let Some(number) = &lead.service_number {
            if leads.values().any(|l| l.service_number.as_ref() == Some(number)) {
                return Err(LeadflowError::Database("UNIQUE constraint failed".into()));
            }
        }
        let mut lead = lead;
        lead.id = leads.keys().max().copied().unwrap_or(0) + 1;
        leads.insert(lead.id, lead.clone());
        Ok(lead)
    }

    async fn update(&self, lead: &Lead) -> DomainResult<()> {
        let mut leads = self.leads.lock().unwrap();
        match leads.get_mut(&lead.id) {
            Some(stored) => {
                *stored = lead.clone();
                Ok(())
            }
            None => Err(LeadflowError::NotFound(format!("Lead {}", lead.id))),
        }
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Lead>> {
        Ok(self.get(id))
    }

    async fn exists(&self, id: i64) -> DomainResult<bool> {
        Ok(self.leads.lock().unwrap().contains_key(&id))
    }

    async fn list_missing_service_number(
        &self,
        category: Option<LeadCategory>,
    ) -> DomainResult<Vec<Lead>> {
        Ok(self
            .leads
            .lock()
            .unwrap()
            .values()
            .filter(|l| !l.has_service_number())
            .filter(|l| category.is_none() || l.category == category)
            .cloned()
            .collect())
    }

    async fn set_service_number(&self, id: i64, number: &str) -> DomainResult<()> {
        if let Some(lead) = self.leads.lock().unwrap().get_mut(&id) {
            lead.service_number = Some(number.to_string());
        }
        Ok(())
    }

    async fn mark_notified(&self, id: i64, kind: NotificationKind) -> DomainResult<()> {
        if let Some(lead) = self.leads.lock().unwrap().get_mut(&id) {
            match kind {
                NotificationKind::NewRequest => lead.notify_new_sent = true,
                NotificationKind::Won => lead.notify_won_sent = true,
            }
        }
        Ok(())
    }

    async fn post_note(&self, lead_id: i64, body: &str) -> DomainResult<LeadNote> {
        let mut notes = self.notes.lock().unwrap();
        let note = LeadNote {
            id: notes.len() as i64 + 1,
            lead_id,
            body: body.to_string(),
            created_at: Utc::now(),
        };
        notes.push(note.clone());
        Ok(note)
    }

    async fn list_notes(&self, lead_id: i64) -> DomainResult<Vec<LeadNote>> {
        Ok(self.notes.lock().unwrap().iter().filter(|n| n.lead_id == lead_id).cloned().collect())
    }

    async fn count_by_stage(&self) -> DomainResult<HashMap<i64, u64>> {
        let mut counts = HashMap::new();
        for lead in self.leads.lock().unwrap().values() {
            if let Some(stage_id) = lead.stage_id {
                *counts.entry(stage_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn count_for_technician(&self, usta_id: i64, stage_ids: &[i64]) -> DomainResult<u64> {
        Ok(self
            .leads
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.active && l.usta_id == Some(usta_id))
            .filter(|l| l.stage_id.is_some_and(|s| stage_ids.contains(&s)))
            .count() as u64)
    }
}

#[derive(Default, Clone)]
pub struct MockStageRepository {
    stages: Arc<Vec<Stage>>,
}

impl MockStageRepository {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages: Arc::new(stages) }
    }
}

#[async_trait]
impl StageRepository for MockStageRepository {
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Stage>> {
        Ok(self.stages.iter().find(|s| s.id == id).cloned())
    }

    async fn list(&self) -> DomainResult<Vec<Stage>> {
        let mut stages = self.stages.as_ref().clone();
        stages.sort_by_key(|s| (s.sequence, s.id));
        Ok(stages)
    }
}

#[derive(Default, Clone)]
pub struct MockEmployeeRepository {
    employees: Arc<Vec<Employee>>,
}

impl MockEmployeeRepository {
    pub fn new(employees: Vec<Employee>) -> Self {
        Self { employees: Arc::new(employees) }
    }
}

#[async_trait]
impl EmployeeRepository for MockEmployeeRepository {
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Employee>> {
        Ok(self.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn list_technicians(&self) -> DomainResult<Vec<Employee>> {
        Ok(self.employees.iter().filter(|e| e.is_usta && e.active).cloned().collect())
    }
}

#[derive(Default, Clone)]
pub struct MockStageHistory {
    events: Arc<Mutex<Vec<StageChangeEvent>>>,
}

impl MockStageHistory {
    pub fn events(&self) -> Vec<StageChangeEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl StageHistoryRepository for MockStageHistory {
    async fn record(&self, event: &StageChangeEvent) -> DomainResult<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn list_for_lead(&self, lead_id: i64) -> DomainResult<Vec<StageChangeEvent>> {
        let mut events: Vec<_> =
            self.events.lock().unwrap().iter().filter(|e| e.lead_id == lead_id).cloned().collect();
        events.sort_by_key(|e| e.occurred_at);
        Ok(events)
    }
}

struct Counter {
    prefix: String,
    padding: usize,
    next: i64,
}

/// Named counters keyed by `(code, company)`.
#[derive(Default, Clone)]
pub struct MockSequence {
    counters: Arc<Mutex<HashMap<(String, Option<i64>), Counter>>>,
}

impl MockSequence {
    pub fn with_counter(self, code: &str, company_id: Option<i64>, prefix: &str, padding: usize) -> Self {
        self.counters.lock().unwrap().insert(
            (code.to_string(), company_id),
            Counter { prefix: prefix.to_string(), padding, next: 1 },
        );
        self
    }
}

#[async_trait]
impl SequenceGenerator for MockSequence {
    async fn next_value(&self, code: &str, company_id: Option<i64>) -> DomainResult<Option<String>> {
        let mut counters = self.counters.lock().unwrap();
        Ok(counters.get_mut(&(code.to_string(), company_id)).map(|c| {
            let value = format!("{}{:0width$}", c.prefix, c.next, width = c.padding);
            c.next += 1;
            value
        }))
    }
}

#[derive(Default, Clone)]
pub struct MockOutbox {
    entries: Arc<Mutex<Vec<OutboxEntry>>>,
}

impl MockOutbox {
    pub fn entries(&self) -> Vec<OutboxEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationOutbox for MockOutbox {
    async fn enqueue(&self, entry: &OutboxEntry) -> DomainResult<()> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn mark_sent(&self, id: &str, sent_at: chrono::DateTime<Utc>) -> DomainResult<()> {
        if let Some(entry) = self.entries.lock().unwrap().iter_mut().find(|e| e.id == id) {
            entry.status = OutboxStatus::Sent;
            entry.sent_at = Some(sent_at);
            entry.attempts += 1;
        }
        Ok(())
    }

    async fn mark_failed(&self, id: &str, error: &str) -> DomainResult<()> {
        if let Some(entry) = self.entries.lock().unwrap().iter_mut().find(|e| e.id == id) {
            entry.status = OutboxStatus::Failed;
            entry.last_error = Some(error.to_string());
            entry.attempts += 1;
        }
        Ok(())
    }

    async fn list_pending(&self, limit: usize) -> DomainResult<Vec<OutboxEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.status == OutboxStatus::Pending)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_for_lead(&self, lead_id: i64) -> DomainResult<Vec<OutboxEntry>> {
        Ok(self.entries.lock().unwrap().iter().filter(|e| e.lead_id == lead_id).cloned().collect())
    }
}

#[derive(Default, Clone)]
pub struct MockFinanceRepository {
    records: Arc<Mutex<Vec<FinanceRecord>>>,
}

impl MockFinanceRepository {
    pub fn records(&self) -> Vec<FinanceRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl FinanceRepository for MockFinanceRepository {
    async fn insert(&self, record: &NewFinanceRecord) -> DomainResult<FinanceRecord> {
        let mut records = self.records.lock().unwrap();
        let stored = FinanceRecord {
            id: records.len() as i64 + 1,
            lead_id: record.lead_id,
            employee_id: record.employee_id,
            kind: record.kind,
            direction: record.direction,
            amount: record.amount,
            signed_amount: record.signed_amount(),
            note: record.note.clone(),
            created_at: Utc::now(),
        };
        records.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_lead(&self, lead_id: i64) -> DomainResult<Vec<FinanceRecord>> {
        Ok(self.records.lock().unwrap().iter().filter(|r| r.lead_id == lead_id).cloned().collect())
    }

    async fn summarize(&self, lead_ids: &[i64]) -> DomainResult<HashMap<i64, FinanceSummary>> {
        let mut map: HashMap<i64, FinanceSummary> = HashMap::new();
        for record in self.records.lock().unwrap().iter() {
            if lead_ids.contains(&record.lead_id) {
                let summary = map.entry(record.lead_id).or_default();
                summary.count += 1;
                summary.amount_sum += record.signed_amount;
            }
        }
        Ok(map)
    }

    async fn has_record(&self, lead_id: i64, kind: FinanceKind) -> DomainResult<bool> {
        Ok(self.records.lock().unwrap().iter().any(|r| r.lead_id == lead_id && r.kind == kind))
    }
}

#[derive(Default, Clone)]
pub struct MockProductLineRepository {
    lines: Arc<Mutex<Vec<ProductLine>>>,
    sales: Arc<Mutex<Vec<SaleSyncLine>>>,
}

impl MockProductLineRepository {
    pub fn with_sale(self, sale: SaleSyncLine) -> Self {
        self.sales.lock().unwrap().push(sale);
        self
    }
}

#[async_trait]
impl ProductLineRepository for MockProductLineRepository {
    async fn insert(&self, line: &NewProductLine) -> DomainResult<ProductLine> {
        let mut lines = self.lines.lock().unwrap();
        let stored = ProductLine {
            id: lines.len() as i64 + 1,
            lead_id: line.lead_id,
            sequence: line.sequence,
            product_name: line.product_name.clone(),
            description: line.description.clone(),
            quantity: line.quantity,
            price_unit: line.price_unit,
            sale_sync_id: line.sale_sync_id,
        };
        lines.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_lead(&self, lead_id: i64) -> DomainResult<Vec<ProductLine>> {
        let mut lines: Vec<_> =
            self.lines.lock().unwrap().iter().filter(|l| l.lead_id == lead_id).cloned().collect();
        lines.sort_by_key(|l| (l.sequence, l.id));
        Ok(lines)
    }

    async fn find_sale(&self, sale_id: i64) -> DomainResult<Option<SaleSyncLine>> {
        Ok(self.sales.lock().unwrap().iter().find(|s| s.id == sale_id).cloned())
    }
}

#[derive(Default, Clone)]
pub struct MockProductWorkRepository {
    works: Arc<Mutex<Vec<ProductWork>>>,
}

#[async_trait]
impl ProductWorkRepository for MockProductWorkRepository {
    async fn insert(&self, work: &ProductWork) -> DomainResult<ProductWork> {
        let mut works = self.works.lock().unwrap();
        let mut stored = work.clone();
        stored.id = works.len() as i64 + 1;
        works.push(stored.clone());
        Ok(stored)
    }

    async fn latest(&self, lead_id: i64, usta_id: Option<i64>) -> DomainResult<Option<ProductWork>> {
        Ok(self
            .works
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.lead_id == lead_id && usta_id.map_or(true, |u| w.usta_id == u))
            .max_by_key(|w| (w.created_at, w.id))
            .cloned())
    }
}

#[derive(Default, Clone)]
pub struct MockPartMoveRepository {
    moves: Arc<Mutex<Vec<PartMove>>>,
}

#[async_trait]
impl PartMoveRepository for MockPartMoveRepository {
    async fn insert(&self, part_move: &PartMove) -> DomainResult<PartMove> {
        let mut moves = self.moves.lock().unwrap();
        let mut stored = part_move.clone();
        stored.id = moves.len() as i64 + 1;
        moves.push(stored.clone());
        Ok(stored)
    }

    async fn count_by_type(&self, lead_id: i64, move_type: MoveType) -> DomainResult<u64> {
        Ok(self
            .moves
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.lead_id == lead_id && m.move_type == move_type)
            .count() as u64)
    }
}

/// Call log that can be switched into a failing mode.
#[derive(Default, Clone)]
pub struct MockCallRepository {
    calls: Arc<Vec<CallRecord>>,
    fail: bool,
}

impl MockCallRepository {
    pub fn new(calls: Vec<CallRecord>) -> Self {
        Self { calls: Arc::new(calls), fail: false }
    }

    pub fn failing() -> Self {
        Self { calls: Arc::new(Vec::new()), fail: true }
    }
}

#[async_trait]
impl CallRepository for MockCallRepository {
    async fn count_matching(&self, filter: &CallFilter) -> DomainResult<u64> {
        if self.fail {
            return Err(LeadflowError::Database("call table unavailable".into()));
        }
        Ok(self.calls.iter().filter(|c| filter.matches(c)).count() as u64)
    }

    async fn list_matching(&self, filter: &CallFilter, limit: usize) -> DomainResult<Vec<CallRecord>> {
        if self.fail {
            return Err(LeadflowError::Database("call table unavailable".into()));
        }
        let mut calls: Vec<_> = self.calls.iter().filter(|c| filter.matches(c)).cloned().collect();
        calls.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        calls.truncate(limit);
        Ok(calls)
    }
}
