//! SQLite adapters for product lines, take/return records and part moves.

use std::sync::Arc;

use async_trait::async_trait;
use leadflow_core::{PartMoveRepository, ProductLineRepository, ProductWorkRepository};
use leadflow_domain::{
    MoveType, NewProductLine, PartMove, ProductLine, ProductWork, Result as DomainResult,
    SaleSyncLine,
};
use rusqlite::{params, OptionalExtension, Row};

use super::common::{get_enum, get_opt_time, get_time, opt_millis, to_millis, with_connection};
use super::manager::{map_sql_error, DbManager};

pub struct SqliteProductLineRepository {
    db: Arc<DbManager>,
}

impl SqliteProductLineRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Store a sale record pulled from the point-of-sale system. Returns its id.
    pub async fn save_sale(&self, sale: &SaleSyncLine) -> DomainResult<i64> {
        let sale = sale.clone();
        with_connection(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO sale_sync
                    (product_name, serial_name, lot_name, warehouse_name, salesperson_name,
                     buyer_name, buyer_phone, quantity, price_unit, sale_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    sale.product_name,
                    sale.serial_name,
                    sale.lot_name,
                    sale.warehouse_name,
                    sale.salesperson_name,
                    sale.buyer_name,
                    sale.buyer_phone,
                    sale.quantity,
                    sale.price_unit,
                    opt_millis(sale.sale_date),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }
}

#[async_trait]
impl ProductLineRepository for SqliteProductLineRepository {
    async fn insert(&self, line: &NewProductLine) -> DomainResult<ProductLine> {
        let line = line.clone();
        with_connection(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO product_lines
                    (lead_id, sequence, product_name, description, quantity, price_unit, sale_sync_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    line.lead_id,
                    line.sequence,
                    line.product_name,
                    line.description,
                    line.quantity,
                    line.price_unit,
                    line.sale_sync_id,
                ],
            )
            .map_err(map_sql_error)?;
            Ok(ProductLine {
                id: conn.last_insert_rowid(),
                lead_id: line.lead_id,
                sequence: line.sequence,
                product_name: line.product_name,
                description: line.description,
                quantity: line.quantity,
                price_unit: line.price_unit,
                sale_sync_id: line.sale_sync_id,
            })
        })
        .await
    }

    async fn list_for_lead(&self, lead_id: i64) -> DomainResult<Vec<ProductLine>> {
        with_connection(&self.db, move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, lead_id, sequence, product_name, description, quantity, price_unit,
                            sale_sync_id
                     FROM product_lines WHERE lead_id = ?1 ORDER BY sequence, id",
                )
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map([lead_id], |row| {
                    Ok(ProductLine {
                        id: row.get("id")?,
                        lead_id: row.get("lead_id")?,
                        sequence: row.get("sequence")?,
                        product_name: row.get("product_name")?,
                        description: row.get("description")?,
                        quantity: row.get("quantity")?,
                        price_unit: row.get("price_unit")?,
                        sale_sync_id: row.get("sale_sync_id")?,
                    })
                })
                .map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
    }

    async fn find_sale(&self, sale_id: i64) -> DomainResult<Option<SaleSyncLine>> {
        with_connection(&self.db, move |conn| {
            conn.query_row(
                "SELECT id, product_name, serial_name, lot_name, warehouse_name, salesperson_name,
                        buyer_name, buyer_phone, quantity, price_unit, sale_date
                 FROM sale_sync WHERE id = ?1",
                [sale_id],
                |row| {
                    Ok(SaleSyncLine {
                        id: row.get("id")?,
                        product_name: row.get("product_name")?,
                        serial_name: row.get("serial_name")?,
                        lot_name: row.get("lot_name")?,
                        warehouse_name: row.get("warehouse_name")?,
                        salesperson_name: row.get("salesperson_name")?,
                        buyer_name: row.get("buyer_name")?,
                        buyer_phone: row.get("buyer_phone")?,
                        quantity: row.get("quantity")?,
                        price_unit: row.get("price_unit")?,
                        sale_date: get_opt_time(row, "sale_date")?,
                    })
                },
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
    }
}

pub struct SqliteProductWorkRepository {
    db: Arc<DbManager>,
}

impl SqliteProductWorkRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

fn map_work_row(row: &Row<'_>) -> rusqlite::Result<ProductWork> {
    Ok(ProductWork {
        id: row.get("id")?,
        lead_id: row.get("lead_id")?,
        usta_id: row.get("usta_id")?,
        state: get_enum(row, "state")?,
        note: row.get("note")?,
        tg_user_id: row.get("tg_user_id")?,
        tg_chat_id: row.get("tg_chat_id")?,
        tg_message_id: row.get("tg_message_id")?,
        created_at: get_time(row, "created_at")?,
    })
}

#[async_trait]
impl ProductWorkRepository for SqliteProductWorkRepository {
    async fn insert(&self, work: &ProductWork) -> DomainResult<ProductWork> {
        let mut work = work.clone();
        with_connection(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO product_work
                    (lead_id, usta_id, state, note, tg_user_id, tg_chat_id, tg_message_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    work.lead_id,
                    work.usta_id,
                    work.state.as_str(),
                    work.note,
                    work.tg_user_id,
                    work.tg_chat_id,
                    work.tg_message_id,
                    to_millis(work.created_at),
                ],
            )
            .map_err(map_sql_error)?;
            work.id = conn.last_insert_rowid();
            Ok(work)
        })
        .await
    }

    async fn latest(&self, lead_id: i64, usta_id: Option<i64>) -> DomainResult<Option<ProductWork>> {
        with_connection(&self.db, move |conn| {
            conn.query_row(
                "SELECT id, lead_id, usta_id, state, note, tg_user_id, tg_chat_id, tg_message_id,
                        created_at
                 FROM product_work
                 WHERE lead_id = ?1 AND (?2 IS NULL OR usta_id = ?2)
                 ORDER BY created_at DESC, id DESC
                 LIMIT 1",
                params![lead_id, usta_id],
                map_work_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
    }
}

pub struct SqlitePartMoveRepository {
    db: Arc<DbManager>,
}

impl SqlitePartMoveRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PartMoveRepository for SqlitePartMoveRepository {
    async fn insert(&self, part_move: &PartMove) -> DomainResult<PartMove> {
        let mut part_move = part_move.clone();
        with_connection(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO part_moves (lead_id, move_type, part_name, quantity)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    part_move.lead_id,
                    part_move.move_type.as_str(),
                    part_move.part_name,
                    part_move.quantity,
                ],
            )
            .map_err(map_sql_error)?;
            part_move.id = conn.last_insert_rowid();
            Ok(part_move)
        })
        .await
    }

    async fn count_by_type(&self, lead_id: i64, move_type: MoveType) -> DomainResult<u64> {
        with_connection(&self.db, move |conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM part_moves WHERE lead_id = ?1 AND move_type = ?2",
                    params![lead_id, move_type.as_str()],
                    |row| row.get(0),
                )
                .map_err(map_sql_error)?;
            Ok(count.max(0) as u64)
        })
        .await
    }
}
