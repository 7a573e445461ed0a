//! Storage seam for delivery prices.
//!
//! Each write method is one unit of work: implementations read the old value,
//! write the new one and append the history row atomically, or change nothing.

mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgPricingStore;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::config::CascadeMode;
use crate::core::error::Result;
use crate::features::zones::models::{Area, Governorate, PriceChangeRecord, PriceEntityType};
use crate::features::zones::pricing;

/// New governorate price, already validated
#[derive(Debug, Clone)]
pub struct GovernoratePriceChange {
    pub governorate_id: Uuid,
    pub new_price: Decimal,
    pub reason: String,
    pub changed_by: Option<String>,
    pub cascade: CascadeMode,
}

#[derive(Debug, Clone)]
pub struct GovernoratePriceUpdate {
    pub governorate: Governorate,
    pub old_price: Decimal,
    /// Inheriting areas that received a copy of the new price
    pub materialized_areas: u64,
}

/// New area price (`None` resets to inherit), already validated
#[derive(Debug, Clone)]
pub struct AreaPriceChange {
    pub area_id: Uuid,
    pub new_price: Option<Decimal>,
    pub reason: String,
    pub changed_by: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AreaPriceUpdate {
    pub area: Area,
    pub old_price: Option<Decimal>,
    /// Parent governorate price, read in the same unit of work as the write
    pub governorate_price: Decimal,
}

impl AreaPriceUpdate {
    /// Price charged for the area right after this change
    pub fn effective_price(&self) -> Decimal {
        pricing::resolve_area_price(self.area.price(), self.governorate_price)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PriceHistoryFilter {
    pub entity_type: Option<PriceEntityType>,
    pub entity_id: Option<Uuid>,
}

#[async_trait]
pub trait PricingStore: Send + Sync {
    async fn find_governorate(&self, id: Uuid) -> Result<Option<Governorate>>;

    async fn find_area(&self, id: Uuid) -> Result<Option<Area>>;

    /// Lock + read old price, write new price, append history, then cascade
    /// into inheriting areas when `cascade` is `Materialize`. Unknown id is `NotFound`.
    async fn update_governorate_price(
        &self,
        change: GovernoratePriceChange,
    ) -> Result<GovernoratePriceUpdate>;

    /// Lock + read old price, write new price, append history, read the parent
    /// governorate price. Unknown id is `NotFound`; a missing parent is
    /// `DataIntegrity` and nothing is written.
    async fn update_area_price(&self, change: AreaPriceChange) -> Result<AreaPriceUpdate>;

    /// Newest first, with the total count of matching rows
    async fn list_price_history(
        &self,
        filter: &PriceHistoryFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<PriceChangeRecord>, i64)>;
}
