//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Leadflow
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum LeadflowError {
    #[error("Database error: {0}")]
    Database(String),

    /// Missing or invalid configuration (sequence, credentials, ...).
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    /// Business-rule violation shown to the acting user; blocks the write.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LeadflowError {
    /// Stable label suitable for structured logging fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the error must be surfaced to the acting user.
    ///
    /// Configuration and validation errors block the triggering write; the
    /// rest are downgraded to logging by the callers that tolerate them.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Validation(_) | Self::NotFound(_))
    }
}

/// Result type alias for Leadflow operations
pub type Result<T> = std::result::Result<T, LeadflowError>;
