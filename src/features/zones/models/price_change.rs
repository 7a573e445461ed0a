use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Kind of zone a price change applies to, matching the database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "price_entity_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PriceEntityType {
    Governorate,
    Area,
}

/// Append-only audit row written for every governorate or area price change
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PriceChangeRecord {
    pub id: Uuid,
    pub entity_type: PriceEntityType,
    pub entity_id: Uuid,
    pub old_price: Option<Decimal>,
    pub new_price: Option<Decimal>,
    pub reason: String,
    pub changed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PriceChangeRecord {
    /// Column list matching the struct fields, for `SELECT`/`RETURNING`
    pub const COLUMNS: &'static str =
        "id, entity_type, entity_id, old_price, new_price, reason, changed_by, created_at";
}
