//! Domain types and models

pub mod call;
pub mod context;
pub mod employee;
pub mod finance;
pub mod lead;
pub mod notification;
pub mod part_move;
pub mod product;
pub mod stage;
pub mod stats;

pub use call::{CallDirection, CallFilter, CallRecord};
pub use context::OperationContext;
pub use employee::Employee;
pub use finance::{
    FinanceDirection, FinanceKind, FinanceRecord, FinanceSummary, NewFinanceRecord,
};
pub use lead::{Lead, LeadCategory, LeadNote, LeadUpdate, NewLead};
pub use notification::{Channel, NotificationKind, OutboxEntry, OutboxStatus, SmsReceipt};
pub use part_move::{MoveType, PartMove};
pub use product::{
    product_total, NewProductLine, ProductLine, ProductWork, SaleSyncLine, TelegramOrigin,
    WorkState,
};
pub use stage::{LifecycleState, Stage};
pub use stats::{StageCount, TechnicianStats};
