//! SQLite adapters for the core ports

mod common;
pub mod call_repository;
pub mod employee_repository;
pub mod finance_repository;
pub mod lead_repository;
pub mod manager;
pub mod outbox_repository;
pub mod pool;
pub mod product_repository;
pub mod sequence_repository;
pub mod stage_repository;

pub use call_repository::SqliteCallRepository;
pub use employee_repository::SqliteEmployeeRepository;
pub use finance_repository::SqliteFinanceRepository;
pub use lead_repository::SqliteLeadRepository;
pub use manager::{DbManager, SCHEMA_VERSION};
pub use outbox_repository::SqliteNotificationOutbox;
pub use pool::{create_sqlite_pool, SqliteConnection, SqlitePool};
pub use product_repository::{
    SqlitePartMoveRepository, SqliteProductLineRepository, SqliteProductWorkRepository,
};
pub use sequence_repository::SqliteSequenceRepository;
pub use stage_repository::{SqliteStageHistoryRepository, SqliteStageRepository};
