//! Port interface for PBX call records

use async_trait::async_trait;
use leadflow_domain::{CallFilter, CallRecord, Result};

#[async_trait]
pub trait CallRepository: Send + Sync {
    /// Calls matching the filter; an empty filter matches nothing.
    async fn count_matching(&self, filter: &CallFilter) -> Result<u64>;

    /// Newest first.
    async fn list_matching(&self, filter: &CallFilter, limit: usize) -> Result<Vec<CallRecord>>;
}
