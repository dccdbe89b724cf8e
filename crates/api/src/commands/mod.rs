//! CLI command handlers
//!
//! Each handler wraps its work in [`execute_logged`](crate::utils::command_helpers::execute_logged)
//! so duration and outcome end up in the log.

pub mod imports;
pub mod leads;
pub mod maintenance;
