//! Delivery price rules.
//!
//! An area either carries its own price or inherits the price of its
//! governorate. Everything here is pure; persistence lives in
//! [`crate::features::zones::stores`] and orchestration in
//! [`crate::features::zones::services::PricingService`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::error::{AppError, Result};

/// Reason stored when a governorate price change comes without one
pub const DEFAULT_GOVERNORATE_REASON: &str = "Governorate delivery price updated";

/// Reason stored when an area's price is reset to inherit its governorate
pub const AREA_RESET_REASON: &str = "Area delivery price reset to inherit governorate price";

/// Maximum accepted length of a caller supplied reason
pub const MAX_REASON_LENGTH: usize = 500;

/// Stored price of an area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaPrice {
    Explicit(Decimal),
    Inherited,
}

impl AreaPrice {
    /// NULL and negative (corrupt) values both fall back to inheritance
    pub fn from_stored(stored: Option<Decimal>) -> Self {
        match stored {
            Some(price) if price >= Decimal::ZERO => AreaPrice::Explicit(price),
            _ => AreaPrice::Inherited,
        }
    }

    pub fn source(&self) -> PriceSource {
        match self {
            AreaPrice::Explicit(_) => PriceSource::Explicit,
            AreaPrice::Inherited => PriceSource::Inherited,
        }
    }
}

/// Where an area's effective price comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Explicit,
    Inherited,
}

/// Effective delivery price of an area
pub fn resolve_area_price(area_price: AreaPrice, governorate_price: Decimal) -> Decimal {
    match area_price {
        AreaPrice::Explicit(price) => price,
        AreaPrice::Inherited => governorate_price,
    }
}

/// Decimal places a stored price keeps (`NUMERIC(12, 2)`)
const PRICE_SCALE: u32 = 2;

/// Smallest price that no longer fits `NUMERIC(12, 2)`
const PRICE_LIMIT: i64 = 10_000_000_000;

/// Reject prices storage would refuse or round, before anything touches it
pub fn validate_price(price: Decimal) -> Result<Decimal> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::Validation(format!(
            "Delivery price must be zero or greater, got {}",
            price
        )));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(AppError::Validation(format!(
            "Delivery price must have at most {} decimal places, got {}",
            PRICE_SCALE, price
        )));
    }
    if price >= Decimal::from(PRICE_LIMIT) {
        return Err(AppError::Validation(format!(
            "Delivery price must be less than {}, got {}",
            PRICE_LIMIT, price
        )));
    }
    Ok(price)
}

fn normalize_reason(reason: Option<&str>) -> Result<Option<&str>> {
    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    if let Some(r) = reason {
        if r.chars().count() > MAX_REASON_LENGTH {
            return Err(AppError::Validation(format!(
                "Reason must not exceed {} characters",
                MAX_REASON_LENGTH
            )));
        }
    }
    Ok(reason)
}

/// Reason text for a governorate price change
pub fn governorate_reason(reason: Option<&str>) -> Result<String> {
    Ok(normalize_reason(reason)?
        .unwrap_or(DEFAULT_GOVERNORATE_REASON)
        .to_string())
}

/// Reason text for an area price change.
///
/// Overrides and resets use different templates; a caller supplied reason is
/// appended after the template.
pub fn area_reason(new_price: Option<Decimal>, reason: Option<&str>) -> Result<String> {
    let template = match new_price {
        Some(price) => format!("Area delivery price overridden to {}", price),
        None => AREA_RESET_REASON.to_string(),
    };

    Ok(match normalize_reason(reason)? {
        Some(r) => format!("{}: {}", template, r),
        None => template,
    })
}
