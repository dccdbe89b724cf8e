//! # Leadflow App
//!
//! Application layer: dependency wiring and the `leadflow` command-line
//! entry point.
//!
//! ## Architecture
//! - Depends on `leadflow-domain`, `leadflow-core` and `leadflow-infra`
//! - [`AppContext`] wires SQLite adapters and HTTP gateways into the core
//!   services
//! - [`commands`] exposes the maintenance and reporting operations the binary
//!   dispatches to

pub mod commands;
pub mod context;
pub mod utils;

pub use context::AppContext;
