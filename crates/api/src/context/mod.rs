//! Application context - dependency injection container

use std::sync::Arc;

use chrono::Utc;
use leadflow_core::{
    CallRepository, CallService, EmployeeRepository, FinanceRepository, FinanceService,
    LeadInsights, LeadPipeline, LeadRepository, NotificationOutbox, NotificationService,
    PartMoveRepository, ProductLineRepository, ProductService, ProductWorkRepository,
    SequenceGenerator, ServiceNumberIssuer, StageHistoryRepository, StageRepository,
    StatsService,
};
use leadflow_domain::{Config, LeadflowError, OperationContext, Result};
use leadflow_infra::{
    build_sms_gateway, DbManager, SqliteCallRepository, SqliteEmployeeRepository,
    SqliteFinanceRepository, SqliteLeadRepository, SqliteNotificationOutbox,
    SqlitePartMoveRepository, SqliteProductLineRepository, SqliteProductWorkRepository,
    SqliteSequenceRepository, SqliteStageHistoryRepository, SqliteStageRepository,
    TelegramClient,
};
use tracing::info;

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Holds the database, adapters and services for one process.
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,

    // Adapters with import/configuration methods beyond their ports
    pub leads: Arc<SqliteLeadRepository>,
    pub stages: Arc<SqliteStageRepository>,
    pub employees: Arc<SqliteEmployeeRepository>,
    pub sequences: Arc<SqliteSequenceRepository>,
    pub outbox: Arc<SqliteNotificationOutbox>,
    pub product_lines: Arc<SqliteProductLineRepository>,
    pub part_moves: Arc<SqlitePartMoveRepository>,
    pub call_log: Arc<SqliteCallRepository>,

    // Services
    pub pipeline: Arc<LeadPipeline>,
    pub insights: Arc<LeadInsights>,
    pub notifications: Arc<NotificationService>,
    pub finance: Arc<FinanceService>,
    pub products: Arc<ProductService>,
    pub calls: Arc<CallService>,
    pub stats: Arc<StatsService>,

    telegram_enabled: bool,
    sms_enabled: bool,
}

impl AppContext {
    /// Open the database, apply migrations and wire every service.
    ///
    /// Telegram and SMS are optional: a missing bot token or incomplete SMS
    /// credentials leave the channel disabled rather than failing startup.
    pub fn new(config: Config) -> Result<Self> {
        let db = Arc::new(DbManager::from_config(&config.database)?);
        db.run_migrations()?;

        let leads = Arc::new(SqliteLeadRepository::new(db.clone()));
        let stages = Arc::new(SqliteStageRepository::new(db.clone()));
        let employees = Arc::new(SqliteEmployeeRepository::new(db.clone()));
        let history = Arc::new(SqliteStageHistoryRepository::new(db.clone()));
        let sequences = Arc::new(SqliteSequenceRepository::new(db.clone()));
        let outbox = Arc::new(SqliteNotificationOutbox::new(db.clone()));
        let finance_repo = Arc::new(SqliteFinanceRepository::new(db.clone()));
        let product_lines = Arc::new(SqliteProductLineRepository::new(db.clone()));
        let product_work = Arc::new(SqliteProductWorkRepository::new(db.clone()));
        let part_moves = Arc::new(SqlitePartMoveRepository::new(db.clone()));
        let call_log = Arc::new(SqliteCallRepository::new(db.clone()));

        let lead_port: Arc<dyn LeadRepository> = leads.clone();
        let stage_port: Arc<dyn StageRepository> = stages.clone();
        let employee_port: Arc<dyn EmployeeRepository> = employees.clone();
        let history_port: Arc<dyn StageHistoryRepository> = history;
        let sequence_port: Arc<dyn SequenceGenerator> = sequences.clone();
        let outbox_port: Arc<dyn NotificationOutbox> = outbox.clone();
        let finance_port: Arc<dyn FinanceRepository> = finance_repo;
        let line_port: Arc<dyn ProductLineRepository> = product_lines.clone();
        let work_port: Arc<dyn ProductWorkRepository> = product_work;
        let part_port: Arc<dyn PartMoveRepository> = part_moves.clone();
        let call_port: Arc<dyn CallRepository> = call_log.clone();

        let mut notifications =
            NotificationService::new(outbox_port, lead_port.clone(), employee_port.clone());
        let telegram = TelegramClient::from_config(&config.telegram)?;
        let telegram_enabled = telegram.is_some();
        if let Some(client) = telegram {
            notifications = notifications.with_telegram(Arc::new(client));
        }
        let sms = build_sms_gateway(&config.sms)?;
        let sms_enabled = sms.is_some();
        if let Some(gateway) = sms {
            notifications = notifications.with_sms(gateway, config.sms.clone());
        }
        let notifications = Arc::new(notifications);

        let finance = Arc::new(FinanceService::new(finance_port, config.finance.clone()));

        let pipeline = LeadPipeline::new(
            lead_port.clone(),
            stage_port.clone(),
            employee_port,
            history_port.clone(),
            ServiceNumberIssuer::new(sequence_port, config.numbering.clone()),
            notifications.clone(),
            config.stages.clone(),
        )
        .with_finance(finance.clone());

        let insights =
            Arc::new(LeadInsights::new(lead_port.clone(), stage_port.clone(), history_port));
        let products = Arc::new(ProductService::new(line_port, work_port, lead_port.clone()));
        let calls = Arc::new(CallService::new(call_port));
        let stats = Arc::new(StatsService::new(lead_port, stage_port, part_port));

        info!(
            database = %db.path().display(),
            telegram = telegram_enabled,
            sms = sms_enabled,
            "application context ready"
        );

        Ok(Self {
            config,
            db,
            leads,
            stages,
            employees,
            sequences,
            outbox,
            product_lines,
            part_moves,
            call_log,
            pipeline: Arc::new(pipeline),
            insights,
            notifications,
            finance,
            products,
            calls,
            stats,
            telegram_enabled,
            sms_enabled,
        })
    }

    /// Context for an operation performed now by `actor`.
    pub fn operation_context(&self, actor: Option<&str>) -> OperationContext {
        let ctx = OperationContext::new(Utc::now());
        match actor {
            Some(name) => ctx.with_actor(name),
            None => ctx,
        }
    }

    /// Database reachability, schema version and notification channels.
    pub async fn health_check(&self) -> HealthStatus {
        let mut status = HealthStatus::new()
            .add_component(self.check_database_health().await)
            .add_component(self.check_schema().await)
            .add_component(channel_health("telegram", self.telegram_enabled))
            .add_component(channel_health("sms", self.sms_enabled));
        status.calculate_score();
        status
    }

    async fn check_database_health(&self) -> ComponentHealth {
        let db = self.db.clone();
        match tokio::task::spawn_blocking(move || db.health_check()).await {
            Ok(Ok(())) => ComponentHealth::healthy("database"),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "database health check failed");
                ComponentHealth::unhealthy("database", format!("query failed: {e}"))
            }
            Err(e) => {
                tracing::error!(error = %e, "database health check task panicked");
                ComponentHealth::unhealthy("database", format!("task panic: {e}"))
            }
        }
    }

    async fn check_schema(&self) -> ComponentHealth {
        let db = self.db.clone();
        let version = tokio::task::spawn_blocking(move || db.schema_version())
            .await
            .map_err(|e| LeadflowError::Internal(format!("schema check task failed: {e}")))
            .and_then(|inner| inner);
        match version {
            Ok(Some(v)) if v == leadflow_infra::SCHEMA_VERSION => {
                ComponentHealth::healthy("schema").with_message(format!("version {v}"))
            }
            Ok(Some(v)) => ComponentHealth::unhealthy("schema", format!("unexpected version {v}")),
            Ok(None) => ComponentHealth::unhealthy("schema", "migrations not applied"),
            Err(e) => ComponentHealth::unhealthy("schema", e.to_string()),
        }
    }
}

fn channel_health(name: &str, enabled: bool) -> ComponentHealth {
    let health = ComponentHealth::healthy(name);
    if enabled {
        health.with_message("enabled")
    } else {
        health.with_message("disabled")
    }
}
