use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::zones::dtos::{AreaResponseDto, GovernorateResponseDto};
use crate::features::zones::models::{PriceChangeRecord, PriceEntityType};
use crate::features::zones::pricing::PriceSource;
use crate::features::zones::services::EffectiveAreaPrice;
use crate::features::zones::stores::PriceHistoryFilter;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetGovernoratePriceDto {
    /// New price, zero or greater
    pub delivery_price: Decimal,

    /// Free text stored in the price history; a default is used when blank
    #[validate(length(max = 500, message = "Reason must not exceed 500 characters"))]
    pub reason: Option<String>,
}

/// `deliveryPrice: null` (or omitted) resets the area to inherit its governorate price
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetAreaPriceDto {
    #[serde(default)]
    pub delivery_price: Option<Decimal>,

    #[validate(length(max = 500, message = "Reason must not exceed 500 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GovernoratePriceUpdateResponseDto {
    pub governorate: GovernorateResponseDto,
    pub old_price: Decimal,
    /// Inheriting areas that received a copy of the new price
    pub materialized_areas: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AreaPriceUpdateResponseDto {
    pub area: AreaResponseDto,
    pub old_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveAreaPriceDto {
    pub area_id: Uuid,
    pub governorate_id: Uuid,
    pub price: Decimal,
    pub source: PriceSource,
}

impl From<EffectiveAreaPrice> for EffectiveAreaPriceDto {
    fn from(p: EffectiveAreaPrice) -> Self {
        Self {
            area_id: p.area_id,
            governorate_id: p.governorate_id,
            price: p.price,
            source: p.source,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryQuery {
    /// `governorate` or `area`
    pub entity_type: Option<PriceEntityType>,
    pub entity_id: Option<Uuid>,
}

impl From<PriceHistoryQuery> for PriceHistoryFilter {
    fn from(q: PriceHistoryQuery) -> Self {
        Self {
            entity_type: q.entity_type,
            entity_id: q.entity_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceChangeRecordDto {
    pub id: Uuid,
    pub entity_type: PriceEntityType,
    pub entity_id: Uuid,
    pub old_price: Option<Decimal>,
    pub new_price: Option<Decimal>,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<PriceChangeRecord> for PriceChangeRecordDto {
    fn from(r: PriceChangeRecord) -> Self {
        Self {
            id: r.id,
            entity_type: r.entity_type,
            entity_id: r.entity_id,
            old_price: r.old_price,
            new_price: r.new_price,
            reason: r.reason,
            changed_by: r.changed_by,
            created_at: r.created_at,
        }
    }
}
