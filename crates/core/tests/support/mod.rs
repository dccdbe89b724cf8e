//! Shared test helpers for `leadflow-core` integration tests.
//!
//! [`Harness`] wires every service to the in-memory mocks so tests can drive
//! the pipeline and inspect storage side by side.

#![allow(dead_code)]

pub mod gateways;
pub mod repositories;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use leadflow_core::{FinanceService, LeadInsights, LeadPipeline, NotificationService, ServiceNumberIssuer};
use leadflow_domain::constants::SERVICE_SEQUENCE_CODE;
use leadflow_domain::{
    Employee, FinanceConfig, LeadCategory, NewLead, NumberingConfig, OperationContext, SmsConfig,
    SmsProvider, Stage, StageConfig,
};

use self::gateways::{MockSms, MockTelegram};
use self::repositories::*;

pub const STAGE_NEW: i64 = 1;
pub const STAGE_ACCEPTED: i64 = 2;
pub const STAGE_IN_PROGRESS: i64 = 3;
pub const STAGE_FINISHED: i64 = 4;
pub const STAGE_WON: i64 = 5;

pub const USTA_ID: i64 = 7;
pub const USTA_CHAT: &str = "555001";
pub const REGION_ID: i64 = 100;
pub const STATE_ID: i64 = 10;

pub fn stages() -> Vec<Stage> {
    let mut stages = vec![
        Stage::new(STAGE_NEW, "Yangi so'rovlar"),
        Stage::new(STAGE_ACCEPTED, "Qabul qilindi"),
        Stage::new(STAGE_IN_PROGRESS, "Jarayonda"),
        Stage::new(STAGE_FINISHED, "Ish yakunlandi"),
        Stage::new(STAGE_WON, "Tasdiqlandi").won(),
    ];
    for (i, stage) in stages.iter_mut().enumerate() {
        stage.sequence = (i as i32 + 1) * 10;
    }
    stages
}

pub fn technician() -> Employee {
    Employee {
        id: USTA_ID,
        name: "Aziz Usta".into(),
        is_usta: true,
        active: true,
        service_region_ids: vec![REGION_ID],
        state_ids: vec![STATE_ID],
        tg_chat_id: Some(USTA_CHAT.into()),
    }
}

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
}

pub fn ctx(now: DateTime<Utc>) -> OperationContext {
    OperationContext::new(now).with_actor("Operator").with_timezone_name("Asia/Tashkent")
}

pub fn servis_lead(name: &str) -> NewLead {
    NewLead {
        name: name.into(),
        category: Some(LeadCategory::Servis),
        phone: Some("+998 90 123 45 67".into()),
        ..NewLead::default()
    }
}

/// Services wired to in-memory storage.
pub struct Harness {
    pub leads: MockLeadRepository,
    pub history: MockStageHistory,
    pub sequence: MockSequence,
    pub outbox: MockOutbox,
    pub finance_repo: MockFinanceRepository,
    pub telegram: MockTelegram,
    pub sms: MockSms,
    pub notifications: Arc<NotificationService>,
    pub finance: Arc<FinanceService>,
    pub pipeline: LeadPipeline,
    pub insights: LeadInsights,
}

impl Harness {
    /// Global counter `SRV00001..`, Telegram enabled, SMS disabled.
    pub fn new() -> Self {
        Self::build(
            MockSequence::default().with_counter(SERVICE_SEQUENCE_CODE, None, "SRV", 5),
            MockTelegram::default(),
            false,
        )
    }

    pub fn without_sequence() -> Self {
        Self::build(MockSequence::default(), MockTelegram::default(), false)
    }

    pub fn with_failing_telegram() -> Self {
        Self::build(
            MockSequence::default().with_counter(SERVICE_SEQUENCE_CODE, None, "SRV", 5),
            MockTelegram::failing(),
            false,
        )
    }

    pub fn with_sms() -> Self {
        Self::build(
            MockSequence::default().with_counter(SERVICE_SEQUENCE_CODE, None, "SRV", 5),
            MockTelegram::default(),
            true,
        )
    }

    pub fn with_sequence(sequence: MockSequence) -> Self {
        Self::build(sequence, MockTelegram::default(), false)
    }

    fn build(sequence: MockSequence, telegram: MockTelegram, sms_enabled: bool) -> Self {
        let leads = MockLeadRepository::default();
        let stage_repo = MockStageRepository::new(stages());
        let employees = MockEmployeeRepository::new(vec![technician()]);
        let history = MockStageHistory::default();
        let outbox = MockOutbox::default();
        let finance_repo = MockFinanceRepository::default();
        let sms = MockSms::default();

        let mut notifications = NotificationService::new(
            Arc::new(outbox.clone()),
            Arc::new(leads.clone()),
            Arc::new(employees.clone()),
        )
        .with_telegram(Arc::new(telegram.clone()));
        if sms_enabled {
            let config = SmsConfig { provider: SmsProvider::Eskiz, ..SmsConfig::default() };
            notifications = notifications.with_sms(Arc::new(sms.clone()), config);
        }
        let notifications = Arc::new(notifications);

        let finance =
            Arc::new(FinanceService::new(Arc::new(finance_repo.clone()), FinanceConfig::default()));

        let pipeline = LeadPipeline::new(
            Arc::new(leads.clone()),
            Arc::new(stage_repo.clone()),
            Arc::new(employees),
            Arc::new(history.clone()),
            ServiceNumberIssuer::new(Arc::new(sequence.clone()), NumberingConfig::default()),
            notifications.clone(),
            StageConfig::default(),
        )
        .with_finance(finance.clone());

        let insights =
            LeadInsights::new(Arc::new(leads.clone()), Arc::new(stage_repo), Arc::new(history.clone()));

        Self {
            leads,
            history,
            sequence,
            outbox,
            finance_repo,
            telegram,
            sms,
            notifications,
            finance,
            pipeline,
            insights,
        }
    }
}
