//! Logging, health reporting and command helpers

pub mod command_helpers;
pub mod health;
pub mod logging;
