//! Product lines and take/return audit records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Product attached to a lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLine {
    pub id: i64,
    pub lead_id: i64,
    pub sequence: i32,
    pub product_name: String,
    pub description: Option<String>,
    pub quantity: f64,
    pub price_unit: f64,
    /// Sale record the line was created from.
    pub sale_sync_id: Option<i64>,
}

impl ProductLine {
    pub fn subtotal(&self) -> f64 {
        self.quantity * self.price_unit
    }
}

/// Sum of line subtotals.
pub fn product_total(lines: &[ProductLine]) -> f64 {
    lines.iter().map(ProductLine::subtotal).sum()
}

/// Unsaved product line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProductLine {
    pub lead_id: i64,
    pub sequence: i32,
    pub product_name: String,
    pub description: Option<String>,
    pub quantity: f64,
    pub price_unit: f64,
    pub sale_sync_id: Option<i64>,
}

impl NewProductLine {
    /// Line defaulted from a synced sale: sale price (0 when unknown),
    /// quantity 1, description from the product name.
    pub fn from_sale(lead_id: i64, sale: &SaleSyncLine) -> Self {
        Self {
            lead_id,
            sequence: 10,
            product_name: sale.product_name.clone(),
            description: Some(sale.product_name.clone()),
            quantity: 1.0,
            price_unit: sale.price_unit.unwrap_or(0.0),
            sale_sync_id: Some(sale.id),
        }
    }
}

/// Sale line synced from the point-of-sale system (serial-level).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleSyncLine {
    pub id: i64,
    pub product_name: String,
    pub serial_name: Option<String>,
    pub lot_name: Option<String>,
    pub warehouse_name: Option<String>,
    pub salesperson_name: Option<String>,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub quantity: f64,
    pub price_unit: Option<f64>,
    pub sale_date: Option<DateTime<Utc>>,
}

/// Whether the technician took the product away or brought it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkState {
    Take,
    Return,
}

impl_domain_status_conversions!(WorkState {
    Take => "take",
    Return => "return",
});

/// Take/return audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWork {
    pub id: i64,
    pub lead_id: i64,
    pub usta_id: i64,
    pub state: WorkState,
    pub note: String,
    pub tg_user_id: String,
    pub tg_chat_id: String,
    pub tg_message_id: String,
    pub created_at: DateTime<Utc>,
}

/// Telegram origin of a take/return action; all parts optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelegramOrigin {
    pub user_id: Option<String>,
    pub chat_id: Option<String>,
    pub message_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: f64, price: f64) -> ProductLine {
        ProductLine {
            id: 1,
            lead_id: 1,
            sequence: 10,
            product_name: "Kompressor".into(),
            description: None,
            quantity,
            price_unit: price,
            sale_sync_id: None,
        }
    }

    #[test]
    fn total_sums_subtotals() {
        assert_eq!(product_total(&[line(2.0, 150.0), line(1.0, 25.5)]), 325.5);
        assert_eq!(product_total(&[]), 0.0);
    }

    #[test]
    fn sale_defaults_price_and_quantity() {
        let mut sale = SaleSyncLine {
            id: 9,
            product_name: "Split 12".into(),
            serial_name: Some("SN-1".into()),
            lot_name: None,
            warehouse_name: None,
            salesperson_name: None,
            buyer_name: None,
            buyer_phone: None,
            quantity: 3.0,
            price_unit: Some(4_200_000.0),
            sale_date: None,
        };
        let new = NewProductLine::from_sale(5, &sale);
        assert_eq!(new.quantity, 1.0);
        assert_eq!(new.price_unit, 4_200_000.0);
        assert_eq!(new.sale_sync_id, Some(9));

        sale.price_unit = None;
        assert_eq!(NewProductLine::from_sale(5, &sale).price_unit, 0.0);
    }
}
