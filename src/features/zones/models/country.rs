use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Country that delivery zones belong to
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Country {
    pub id: Uuid,
    pub code: String,
    pub name_en: String,
    pub name_ar: String,
    pub currency_code: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Country {
    /// Column list matching the struct fields, for `SELECT`/`RETURNING`
    pub const COLUMNS: &'static str =
        "id, code, name_en, name_ar, currency_code, is_active, created_at, updated_at";
}
