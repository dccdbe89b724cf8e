//! # Leadflow Core
//!
//! Business logic for the service-lead workflow - no infrastructure
//! dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) implemented by `leadflow-infra`
//! - The lead create/write pipeline and its rules
//! - Notification, finance, product, call and stats services
//!
//! ## Architecture Principles
//! - Only depends on `leadflow-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod calls;
pub mod finance;
pub mod lead;
pub mod notification;
pub mod product;
pub mod stats;

// Re-export ports and services
pub use calls::ports::CallRepository;
pub use calls::CallService;
pub use finance::ports::FinanceRepository;
pub use finance::FinanceService;
pub use lead::ports::{
    EmployeeRepository, LeadRepository, SequenceGenerator, StageHistoryRepository,
    StageRepository,
};
pub use lead::{LeadInsights, LeadOverview, LeadPipeline, ServiceNumberIssuer};
pub use notification::ports::{NotificationOutbox, SmsGateway, TelegramSender};
pub use notification::{DeliveryReport, NotificationService};
pub use product::ports::{PartMoveRepository, ProductLineRepository, ProductWorkRepository};
pub use product::ProductService;
pub use stats::StatsService;
