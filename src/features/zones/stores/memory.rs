//! In-memory `PricingStore` for tests. Writes are staged and only applied when
//! every step succeeds, mirroring the transactional PostgreSQL store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::config::CascadeMode;
use crate::core::error::{AppError, Result};
use crate::features::zones::models::{Area, Governorate, PriceChangeRecord, PriceEntityType};
use crate::features::zones::stores::{
    AreaPriceChange, AreaPriceUpdate, GovernoratePriceChange, GovernoratePriceUpdate,
    PriceHistoryFilter, PricingStore,
};

#[derive(Default)]
struct State {
    governorates: HashMap<Uuid, Governorate>,
    areas: HashMap<Uuid, Area>,
    history: Vec<PriceChangeRecord>,
    fail_history_insert: bool,
    reads: usize,
    writes: usize,
}

#[derive(Default)]
pub struct MemoryPricingStore {
    state: Mutex<State>,
}

impl MemoryPricingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_governorate(&self, name: &str, price: i64) -> Governorate {
        let now = Utc::now();
        let governorate = Governorate {
            id: Uuid::new_v4(),
            country_id: Uuid::new_v4(),
            name_en: name.to_string(),
            name_ar: name.to_string(),
            delivery_price: Decimal::from(price),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.lock()
            .governorates
            .insert(governorate.id, governorate.clone());
        governorate
    }

    pub fn add_area(&self, governorate_id: Uuid, name: &str, price: Option<i64>) -> Area {
        let now = Utc::now();
        let area = Area {
            id: Uuid::new_v4(),
            governorate_id,
            name_en: name.to_string(),
            name_ar: name.to_string(),
            delivery_price: price.map(Decimal::from),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.lock().areas.insert(area.id, area.clone());
        area
    }

    /// Overwrite a stored governorate price without auditing (corrupt data setup)
    pub fn force_governorate_price(&self, id: Uuid, price: Decimal) {
        if let Some(g) = self.lock().governorates.get_mut(&id) {
            g.delivery_price = price;
        }
    }

    pub fn remove_governorate(&self, id: Uuid) {
        self.lock().governorates.remove(&id);
    }

    /// Make the next history append fail, as a backend error would
    pub fn fail_history_insert(&self) {
        self.lock().fail_history_insert = true;
    }

    pub fn governorate(&self, id: Uuid) -> Governorate {
        self.lock().governorates[&id].clone()
    }

    pub fn area(&self, id: Uuid) -> Area {
        self.lock().areas[&id].clone()
    }

    pub fn history(&self) -> Vec<PriceChangeRecord> {
        self.lock().history.clone()
    }

    /// Number of store calls that could have touched storage
    pub fn calls(&self) -> usize {
        let state = self.lock();
        state.reads + state.writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

fn history_record(
    entity_type: PriceEntityType,
    entity_id: Uuid,
    old_price: Option<Decimal>,
    new_price: Option<Decimal>,
    reason: &str,
    changed_by: Option<String>,
) -> PriceChangeRecord {
    PriceChangeRecord {
        id: Uuid::now_v7(),
        entity_type,
        entity_id,
        old_price,
        new_price,
        reason: reason.to_string(),
        changed_by,
        created_at: Utc::now(),
    }
}

fn injected_failure() -> AppError {
    AppError::Database(sqlx::Error::Protocol(
        "injected history insert failure".to_string(),
    ))
}

#[async_trait]
impl PricingStore for MemoryPricingStore {
    async fn find_governorate(&self, id: Uuid) -> Result<Option<Governorate>> {
        let mut state = self.lock();
        state.reads += 1;
        Ok(state.governorates.get(&id).cloned())
    }

    async fn find_area(&self, id: Uuid) -> Result<Option<Area>> {
        let mut state = self.lock();
        state.reads += 1;
        Ok(state.areas.get(&id).cloned())
    }

    async fn update_governorate_price(
        &self,
        change: GovernoratePriceChange,
    ) -> Result<GovernoratePriceUpdate> {
        let mut state = self.lock();
        state.writes += 1;
        let id = change.governorate_id;

        let mut governorate = state
            .governorates
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Governorate '{}' not found", id)))?;
        let old_price = governorate.delivery_price;
        governorate.delivery_price = change.new_price;
        governorate.updated_at = Utc::now();

        if state.fail_history_insert {
            state.fail_history_insert = false;
            return Err(injected_failure());
        }
        let record = history_record(
            PriceEntityType::Governorate,
            id,
            Some(old_price),
            Some(change.new_price),
            &change.reason,
            change.changed_by.clone(),
        );

        let inheriting: Vec<Uuid> = match change.cascade {
            CascadeMode::Materialize => state
                .areas
                .values()
                .filter(|a| a.governorate_id == id && a.delivery_price.is_none())
                .map(|a| a.id)
                .collect(),
            CascadeMode::Virtual => Vec::new(),
        };

        // commit
        state.governorates.insert(id, governorate.clone());
        state.history.push(record);
        for area_id in &inheriting {
            if let Some(area) = state.areas.get_mut(area_id) {
                area.delivery_price = Some(change.new_price);
                area.updated_at = Utc::now();
            }
        }

        Ok(GovernoratePriceUpdate {
            governorate,
            old_price,
            materialized_areas: inheriting.len() as u64,
        })
    }

    async fn update_area_price(&self, change: AreaPriceChange) -> Result<AreaPriceUpdate> {
        let mut state = self.lock();
        state.writes += 1;
        let id = change.area_id;

        let mut area = state
            .areas
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Area '{}' not found", id)))?;
        let old_price = area.delivery_price;
        area.delivery_price = change.new_price;
        area.updated_at = Utc::now();

        let governorate_price = state
            .governorates
            .get(&area.governorate_id)
            .map(|g| g.delivery_price)
            .ok_or_else(|| {
                AppError::DataIntegrity(format!(
                    "Area '{}' references missing governorate '{}'",
                    id, area.governorate_id
                ))
            })?;

        if state.fail_history_insert {
            state.fail_history_insert = false;
            return Err(injected_failure());
        }
        let record = history_record(
            PriceEntityType::Area,
            id,
            old_price,
            change.new_price,
            &change.reason,
            change.changed_by.clone(),
        );

        state.areas.insert(id, area.clone());
        state.history.push(record);

        Ok(AreaPriceUpdate {
            area,
            old_price,
            governorate_price,
        })
    }

    async fn list_price_history(
        &self,
        filter: &PriceHistoryFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<PriceChangeRecord>, i64)> {
        let mut state = self.lock();
        state.reads += 1;

        let matching: Vec<PriceChangeRecord> = state
            .history
            .iter()
            .rev()
            .filter(|r| filter.entity_type.map_or(true, |t| r.entity_type == t))
            .filter(|r| filter.entity_id.map_or(true, |id| r.entity_id == id))
            .cloned()
            .collect();
        let total = matching.len() as i64;

        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }
}
