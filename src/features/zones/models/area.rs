use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::zones::models::Governorate;
use crate::features::zones::pricing::{resolve_area_price, AreaPrice};

/// Delivery zone inside a governorate
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Area {
    pub id: Uuid,
    pub governorate_id: Uuid,
    pub name_en: String,
    pub name_ar: String,
    /// NULL means "inherit the governorate price"
    pub delivery_price: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Area {
    /// Column list matching the struct fields, for `SELECT`/`RETURNING`
    pub const COLUMNS: &'static str =
        "id, governorate_id, name_en, name_ar, delivery_price, is_active, created_at, updated_at";

    pub fn price(&self) -> AreaPrice {
        AreaPrice::from_stored(self.delivery_price)
    }

    /// Price charged for deliveries to this area. `governorate` must be the parent.
    pub fn effective_price(&self, governorate: &Governorate) -> Decimal {
        resolve_area_price(self.price(), governorate.delivery_price)
    }
}
