//! Outbound HTTP

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};

use leadflow_domain::{LeadflowError, Result};
use url::Url;

/// Validate a configured API base URL and strip the trailing slash.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed)
        .map_err(|e| LeadflowError::Config(format!("Invalid API base URL '{trimmed}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(LeadflowError::Config(format!("API base URL must be http(s): {trimmed}")));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
