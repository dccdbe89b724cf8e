//! # Leadflow Domain
//!
//! Business domain types and models for the service-lead workflow.
//!
//! This crate contains:
//! - Domain data types (Lead, Stage, ProductLine, FinanceRecord, etc.)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Pure helpers: duration badges, phone tails, map-link parsing, stage
//!   timeline replay
//!
//! ## Architecture
//! - No dependencies on other Leadflow crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
// Re-export the pure helpers used across crates
pub use utils::duration::{format_badge, format_long_duration, round_hours};
pub use utils::geo::{extract_coordinates, Coordinates};
pub use utils::phone::{digits_only, phone_tail, phone_tails};
pub use utils::timeline::{work_duration, StageChangeEvent, WorkDuration};
