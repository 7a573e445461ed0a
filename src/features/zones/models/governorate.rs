use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Province-level region owning the default delivery price of its areas
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Governorate {
    pub id: Uuid,
    pub country_id: Uuid,
    pub name_en: String,
    pub name_ar: String,
    /// Always present and non-negative
    pub delivery_price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Governorate {
    /// Column list matching the struct fields, for `SELECT`/`RETURNING`
    pub const COLUMNS: &'static str =
        "id, country_id, name_en, name_ar, delivery_price, is_active, created_at, updated_at";
}
