//! # Leadflow Infrastructure
//!
//! Adapters behind the `leadflow-core` ports:
//! - SQLite repositories, sequence counters and the notification outbox
//!   (`rusqlite` on an `r2d2` pool)
//! - Telegram and SMS gateway clients (`reqwest`)
//! - Configuration loading from environment variables and files

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;

pub use database::*;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::*;
