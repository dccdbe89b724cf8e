//! Lead finance aggregation and technician bonuses

pub mod ports;
pub mod service;

pub use service::FinanceService;
