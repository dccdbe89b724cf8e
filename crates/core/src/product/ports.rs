//! Port interfaces for product lines, take/return records and part moves

use async_trait::async_trait;
use leadflow_domain::{
    MoveType, NewProductLine, PartMove, ProductLine, ProductWork, Result, SaleSyncLine,
};

#[async_trait]
pub trait ProductLineRepository: Send + Sync {
    async fn insert(&self, line: &NewProductLine) -> Result<ProductLine>;

    /// Lines ordered by sequence, then id.
    async fn list_for_lead(&self, lead_id: i64) -> Result<Vec<ProductLine>>;

    async fn find_sale(&self, sale_id: i64) -> Result<Option<SaleSyncLine>>;
}

#[async_trait]
pub trait ProductWorkRepository: Send + Sync {
    /// Insert a take/return record; `id` of the argument is ignored.
    async fn insert(&self, work: &ProductWork) -> Result<ProductWork>;

    /// Most recent record for the lead, restricted to a technician when
    /// `usta_id` is set.
    async fn latest(&self, lead_id: i64, usta_id: Option<i64>) -> Result<Option<ProductWork>>;
}

#[async_trait]
pub trait PartMoveRepository: Send + Sync {
    async fn insert(&self, part_move: &PartMove) -> Result<PartMove>;

    async fn count_by_type(&self, lead_id: i64, move_type: MoveType) -> Result<u64>;
}
