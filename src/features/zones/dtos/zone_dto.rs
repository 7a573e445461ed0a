use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::zones::models::{Area, Country, Governorate};
use crate::features::zones::pricing::PriceSource;

/// Filters shared by the zone list endpoints
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ZoneListQuery {
    /// Case-insensitive substring of the English or Arabic name (or the exact
    /// code for countries). `%` and `_` are matched literally.
    pub search: Option<String>,
    /// Only active (`true`) or inactive (`false`) rows
    pub active: Option<bool>,
}

// =============================================================================
// COUNTRIES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountryResponseDto {
    pub id: Uuid,
    pub code: String,
    pub name_en: String,
    pub name_ar: String,
    pub currency_code: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Country> for CountryResponseDto {
    fn from(c: Country) -> Self {
        Self {
            id: c.id,
            code: c.code,
            name_en: c.name_en,
            name_ar: c.name_ar,
            currency_code: c.currency_code,
            is_active: c.is_active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCountryDto {
    /// ISO-3166 alpha-2 code, e.g. "IQ"
    #[validate(regex(
        path = *crate::shared::validation::COUNTRY_CODE_REGEX,
        message = "Country code must be two upper-case letters"
    ))]
    pub code: String,

    #[validate(length(min = 1, max = 100, message = "English name must be 1-100 characters"))]
    pub name_en: String,

    #[validate(length(min = 1, max = 100, message = "Arabic name must be 1-100 characters"))]
    pub name_ar: String,

    /// ISO-4217 code, e.g. "IQD"
    #[validate(regex(
        path = *crate::shared::validation::CURRENCY_CODE_REGEX,
        message = "Currency code must be three upper-case letters"
    ))]
    pub currency_code: String,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCountryDto {
    #[validate(length(min = 1, max = 100, message = "English name must be 1-100 characters"))]
    pub name_en: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Arabic name must be 1-100 characters"))]
    pub name_ar: Option<String>,

    #[validate(regex(
        path = *crate::shared::validation::CURRENCY_CODE_REGEX,
        message = "Currency code must be three upper-case letters"
    ))]
    pub currency_code: Option<String>,

    pub is_active: Option<bool>,
}

// =============================================================================
// GOVERNORATES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GovernorateResponseDto {
    pub id: Uuid,
    pub country_id: Uuid,
    pub name_en: String,
    pub name_ar: String,
    pub delivery_price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Governorate> for GovernorateResponseDto {
    fn from(g: Governorate) -> Self {
        Self {
            id: g.id,
            country_id: g.country_id,
            name_en: g.name_en,
            name_ar: g.name_ar,
            delivery_price: g.delivery_price,
            is_active: g.is_active,
            created_at: g.created_at,
            updated_at: g.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGovernorateDto {
    #[validate(length(min = 1, max = 100, message = "English name must be 1-100 characters"))]
    pub name_en: String,

    #[validate(length(min = 1, max = 100, message = "Arabic name must be 1-100 characters"))]
    pub name_ar: String,

    /// Initial delivery price, zero or greater
    pub delivery_price: Decimal,

    pub is_active: Option<bool>,
}

/// Names and status only; the price has its own audited endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGovernorateDto {
    #[validate(length(min = 1, max = 100, message = "English name must be 1-100 characters"))]
    pub name_en: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Arabic name must be 1-100 characters"))]
    pub name_ar: Option<String>,

    pub is_active: Option<bool>,
}

// =============================================================================
// AREAS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AreaResponseDto {
    pub id: Uuid,
    pub governorate_id: Uuid,
    pub name_en: String,
    pub name_ar: String,
    /// Stored override, `null` when the area inherits
    pub delivery_price: Option<Decimal>,
    /// Price actually charged
    pub effective_price: Decimal,
    pub price_source: PriceSource,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AreaResponseDto {
    /// `governorate` must be the area's parent
    pub fn new(area: Area, governorate: &Governorate) -> Self {
        let effective_price = area.effective_price(governorate);
        Self::with_effective_price(area, effective_price)
    }

    /// Build from a price already resolved for this area
    pub fn with_effective_price(area: Area, effective_price: Decimal) -> Self {
        let price_source = area.price().source();
        Self {
            id: area.id,
            governorate_id: area.governorate_id,
            name_en: area.name_en,
            name_ar: area.name_ar,
            delivery_price: area.delivery_price,
            effective_price,
            price_source,
            is_active: area.is_active,
            created_at: area.created_at,
            updated_at: area.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAreaDto {
    #[validate(length(min = 1, max = 100, message = "English name must be 1-100 characters"))]
    pub name_en: String,

    #[validate(length(min = 1, max = 100, message = "Arabic name must be 1-100 characters"))]
    pub name_ar: String,

    /// Optional override; omit to inherit the governorate price
    pub delivery_price: Option<Decimal>,

    pub is_active: Option<bool>,
}

/// Names and status only; the price has its own audited endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAreaDto {
    #[validate(length(min = 1, max = 100, message = "English name must be 1-100 characters"))]
    pub name_en: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Arabic name must be 1-100 characters"))]
    pub name_ar: Option<String>,

    pub is_active: Option<bool>,
}
