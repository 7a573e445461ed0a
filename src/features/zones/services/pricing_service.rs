use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::config::PricingConfig;
use crate::core::error::{AppError, Result};
use crate::features::zones::models::PriceChangeRecord;
use crate::features::zones::pricing::{self, PriceSource};
use crate::features::zones::stores::{
    AreaPriceChange, AreaPriceUpdate, GovernoratePriceChange, GovernoratePriceUpdate,
    PriceHistoryFilter, PricingStore,
};

/// Resolved delivery price of one area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveAreaPrice {
    pub area_id: Uuid,
    pub governorate_id: Uuid,
    pub price: Decimal,
    pub source: PriceSource,
}

/// Delivery price resolution and audited price changes
pub struct PricingService {
    store: Arc<dyn PricingStore>,
    config: PricingConfig,
}

impl PricingService {
    pub fn new(store: Arc<dyn PricingStore>, config: PricingConfig) -> Self {
        Self { store, config }
    }

    /// Price charged for deliveries to `area_id`
    pub async fn effective_area_price(&self, area_id: Uuid) -> Result<EffectiveAreaPrice> {
        let area = self
            .store
            .find_area(area_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Area '{}' not found", area_id)))?;

        let governorate = self
            .store
            .find_governorate(area.governorate_id)
            .await?
            .ok_or_else(|| {
                AppError::DataIntegrity(format!(
                    "Area '{}' references missing governorate '{}'",
                    area.id, area.governorate_id
                ))
            })?;

        if governorate.id != area.governorate_id {
            return Err(AppError::DataIntegrity(format!(
                "Area '{}' resolved against governorate '{}' instead of '{}'",
                area.id, governorate.id, area.governorate_id
            )));
        }

        if governorate.delivery_price.is_sign_negative() && !governorate.delivery_price.is_zero()
        {
            return Err(AppError::DataIntegrity(format!(
                "Governorate '{}' has a negative delivery price {}",
                governorate.id, governorate.delivery_price
            )));
        }

        let area_price = area.price();
        Ok(EffectiveAreaPrice {
            area_id: area.id,
            governorate_id: governorate.id,
            price: pricing::resolve_area_price(area_price, governorate.delivery_price),
            source: area_price.source(),
        })
    }

    /// Set a governorate's delivery price.
    ///
    /// The price write, its history row and (in `Materialize` mode) the copy
    /// into inheriting areas commit together or not at all.
    pub async fn set_governorate_price(
        &self,
        governorate_id: Uuid,
        new_price: Decimal,
        reason: Option<&str>,
        changed_by: Option<&str>,
    ) -> Result<GovernoratePriceUpdate> {
        let new_price = pricing::validate_price(new_price)?;
        let reason = pricing::governorate_reason(reason)?;

        let update = self
            .store
            .update_governorate_price(GovernoratePriceChange {
                governorate_id,
                new_price,
                reason,
                changed_by: changed_by.map(str::to_string),
                cascade: self.config.cascade_mode,
            })
            .await?;

        tracing::info!(
            governorate_id = %governorate_id,
            old_price = %update.old_price,
            new_price = %new_price,
            materialized_areas = update.materialized_areas,
            "Governorate delivery price changed"
        );

        Ok(update)
    }

    /// Override an area's delivery price, or reset it to inherit with `None`
    pub async fn set_area_price(
        &self,
        area_id: Uuid,
        new_price: Option<Decimal>,
        reason: Option<&str>,
        changed_by: Option<&str>,
    ) -> Result<AreaPriceUpdate> {
        let new_price = new_price.map(pricing::validate_price).transpose()?;
        let reason = pricing::area_reason(new_price, reason)?;

        let update = self
            .store
            .update_area_price(AreaPriceChange {
                area_id,
                new_price,
                reason,
                changed_by: changed_by.map(str::to_string),
            })
            .await?;

        tracing::info!(
            area_id = %area_id,
            old_price = ?update.old_price,
            new_price = ?new_price,
            "Area delivery price changed"
        );

        Ok(update)
    }

    pub async fn list_price_history(
        &self,
        filter: &PriceHistoryFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<PriceChangeRecord>, i64)> {
        self.store.list_price_history(filter, offset, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CascadeMode;
    use crate::features::zones::models::PriceEntityType;
    use crate::features::zones::pricing::AREA_RESET_REASON;
    use crate::features::zones::stores::memory::MemoryPricingStore;
    use fake::{faker::address::en::CityName, Fake};

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn service_with(mode: CascadeMode) -> (Arc<MemoryPricingStore>, PricingService) {
        let store = Arc::new(MemoryPricingStore::new());
        let service = PricingService::new(
            store.clone(),
            PricingConfig {
                cascade_mode: mode,
            },
        );
        (store, service)
    }

    fn service() -> (Arc<MemoryPricingStore>, PricingService) {
        service_with(CascadeMode::Materialize)
    }

    #[tokio::test]
    async fn test_inheriting_area_resolves_to_governorate_price() {
        let (store, service) = service();
        let name: String = CityName().fake();
        let governorate = store.add_governorate(&name, 5000);
        let area = store.add_area(governorate.id, "Karkh", None);

        let effective = service.effective_area_price(area.id).await.unwrap();

        assert_eq!(effective.price, dec(5000));
        assert_eq!(effective.source, PriceSource::Inherited);
        assert_eq!(effective.governorate_id, governorate.id);
    }

    #[tokio::test]
    async fn test_override_wins_over_governorate_price() {
        let (store, service) = service();
        let governorate = store.add_governorate("Baghdad", 5000);
        let area = store.add_area(governorate.id, "Rusafa", Some(7000));

        let effective = service.effective_area_price(area.id).await.unwrap();

        assert_eq!(effective.price, dec(7000));
        assert_eq!(effective.source, PriceSource::Explicit);
    }

    #[tokio::test]
    async fn test_effective_price_unknown_area() {
        let (_store, service) = service();
        let result = service.effective_area_price(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_effective_price_missing_governorate_is_integrity_error() {
        let (store, service) = service();
        let governorate = store.add_governorate("Basra", 4000);
        let area = store.add_area(governorate.id, "Zubair", None);
        store.remove_governorate(governorate.id);

        let result = service.effective_area_price(area.id).await;
        assert!(matches!(result, Err(AppError::DataIntegrity(_))));
    }

    #[tokio::test]
    async fn test_effective_price_negative_governorate_is_integrity_error() {
        let (store, service) = service();
        let governorate = store.add_governorate("Basra", 4000);
        let area = store.add_area(governorate.id, "Zubair", None);
        store.force_governorate_price(governorate.id, dec(-1));

        let result = service.effective_area_price(area.id).await;
        assert!(matches!(result, Err(AppError::DataIntegrity(_))));
    }

    #[tokio::test]
    async fn test_governorate_price_hike_scenario() {
        let (store, service) = service();
        let baghdad = store.add_governorate("Baghdad", 5000);
        let karkh = store.add_area(baghdad.id, "Karkh", None);
        let rusafa = store.add_area(baghdad.id, "Rusafa", Some(7000));

        let update = service
            .set_governorate_price(baghdad.id, dec(6000), Some("price hike"), Some("admin-1"))
            .await
            .unwrap();

        assert_eq!(update.governorate.delivery_price, dec(6000));
        assert_eq!(update.old_price, dec(5000));
        assert_eq!(update.materialized_areas, 1);

        assert_eq!(store.governorate(baghdad.id).delivery_price, dec(6000));
        assert_eq!(store.area(karkh.id).delivery_price, Some(dec(6000)));
        assert_eq!(store.area(rusafa.id).delivery_price, Some(dec(7000)));

        // Only the governorate change is audited; cascaded area writes are not
        let history = store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].entity_type, PriceEntityType::Governorate);
        assert_eq!(history[0].entity_id, baghdad.id);
        assert_eq!(history[0].old_price, Some(dec(5000)));
        assert_eq!(history[0].new_price, Some(dec(6000)));
        assert_eq!(history[0].reason, "price hike");
        assert_eq!(history[0].changed_by.as_deref(), Some("admin-1"));
    }

    #[tokio::test]
    async fn test_governorate_change_leaves_other_governorates_alone() {
        let (store, service) = service();
        let baghdad = store.add_governorate("Baghdad", 5000);
        let erbil = store.add_governorate("Erbil", 8000);
        let ankawa = store.add_area(erbil.id, "Ankawa", None);

        service
            .set_governorate_price(baghdad.id, dec(6000), None, None)
            .await
            .unwrap();

        assert_eq!(store.area(ankawa.id).delivery_price, None);
        assert_eq!(store.governorate(erbil.id).delivery_price, dec(8000));
    }

    #[tokio::test]
    async fn test_virtual_mode_keeps_areas_inheriting() {
        let (store, service) = service_with(CascadeMode::Virtual);
        let baghdad = store.add_governorate("Baghdad", 5000);
        let karkh = store.add_area(baghdad.id, "Karkh", None);

        let update = service
            .set_governorate_price(baghdad.id, dec(6000), Some("price hike"), None)
            .await
            .unwrap();

        assert_eq!(update.materialized_areas, 0);
        assert_eq!(store.area(karkh.id).delivery_price, None);

        let effective = service.effective_area_price(karkh.id).await.unwrap();
        assert_eq!(effective.price, dec(6000));
        assert_eq!(effective.source, PriceSource::Inherited);
    }

    #[tokio::test]
    async fn test_area_change_with_missing_parent_writes_nothing() {
        let (store, service) = service();
        let governorate = store.add_governorate("Basra", 4000);
        let area = store.add_area(governorate.id, "Zubair", Some(2500));
        store.remove_governorate(governorate.id);

        let result = service
            .set_area_price(area.id, Some(dec(3000)), None, None)
            .await;

        assert!(matches!(result, Err(AppError::DataIntegrity(_))));
        assert_eq!(store.area(area.id).delivery_price, Some(dec(2500)));
        assert!(store.history().is_empty());
    }

    #[tokio::test]
    async fn test_area_update_reports_effective_price() {
        let (store, service) = service();
        let baghdad = store.add_governorate("Baghdad", 5000);
        let rusafa = store.add_area(baghdad.id, "Rusafa", Some(7000));

        let reset = service
            .set_area_price(rusafa.id, None, None, None)
            .await
            .unwrap();

        assert_eq!(reset.governorate_price, dec(5000));
        assert_eq!(reset.effective_price(), dec(5000));
    }

    #[tokio::test]
    async fn test_recorded_price_equals_requested_price() {
        let (store, service) = service();
        let baghdad = store.add_governorate("Baghdad", 5000);
        let requested = Decimal::new(599_999, 2);

        let update = service
            .set_governorate_price(baghdad.id, requested, None, None)
            .await
            .unwrap();

        assert_eq!(update.governorate.delivery_price, requested);
        assert_eq!(store.history()[0].new_price, Some(requested));
    }

    #[tokio::test]
    async fn test_unstorable_prices_are_rejected_before_storage() {
        let (store, service) = service();
        let baghdad = store.add_governorate("Baghdad", 5000);
        let karkh = store.add_area(baghdad.id, "Karkh", None);
        let calls_before = store.calls();

        let sub_cent = service
            .set_governorate_price(baghdad.id, Decimal::new(5, 3), None, None)
            .await;
        let too_large = service
            .set_area_price(karkh.id, Some(dec(10_000_000_000)), None, None)
            .await;

        assert!(matches!(sub_cent, Err(AppError::Validation(_))));
        assert!(matches!(too_large, Err(AppError::Validation(_))));
        assert_eq!(store.calls(), calls_before);
        assert!(store.history().is_empty());
    }

    #[tokio::test]
    async fn test_negative_governorate_price_is_rejected_before_storage() {
        let (store, service) = service();
        let baghdad = store.add_governorate("Baghdad", 5000);
        let calls_before = store.calls();

        let result = service
            .set_governorate_price(baghdad.id, dec(-10), Some("bad"), None)
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.calls(), calls_before);
        assert!(store.history().is_empty());
        assert_eq!(store.governorate(baghdad.id).delivery_price, dec(5000));
    }

    #[tokio::test]
    async fn test_unknown_governorate_is_not_found() {
        let (store, service) = service();
        let result = service
            .set_governorate_price(Uuid::new_v4(), dec(1000), None, None)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(store.history().is_empty());
    }

    #[tokio::test]
    async fn test_history_failure_rolls_back_governorate_change() {
        let (store, service) = service();
        let baghdad = store.add_governorate("Baghdad", 5000);
        let karkh = store.add_area(baghdad.id, "Karkh", None);
        store.fail_history_insert();

        let result = service
            .set_governorate_price(baghdad.id, dec(6000), None, None)
            .await;

        assert!(matches!(result, Err(AppError::Database(_))));
        assert_eq!(store.governorate(baghdad.id).delivery_price, dec(5000));
        assert_eq!(store.area(karkh.id).delivery_price, None);
        assert!(store.history().is_empty());
    }

    #[tokio::test]
    async fn test_reset_area_to_inherit() {
        let (store, service) = service();
        let baghdad = store.add_governorate("Baghdad", 5000);
        let rusafa = store.add_area(baghdad.id, "Rusafa", Some(3000));

        let update = service
            .set_area_price(rusafa.id, None, Some("reset"), None)
            .await
            .unwrap();

        assert_eq!(update.old_price, Some(dec(3000)));
        assert_eq!(update.area.delivery_price, None);

        let effective = service.effective_area_price(rusafa.id).await.unwrap();
        assert_eq!(effective.price, dec(5000));

        let history = store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].entity_type, PriceEntityType::Area);
        assert_eq!(history[0].old_price, Some(dec(3000)));
        assert_eq!(history[0].new_price, None);
        assert_eq!(history[0].reason, format!("{}: reset", AREA_RESET_REASON));
    }

    #[tokio::test]
    async fn test_override_area_price_records_history() {
        let (store, service) = service();
        let baghdad = store.add_governorate("Baghdad", 5000);
        let karkh = store.add_area(baghdad.id, "Karkh", None);

        service
            .set_area_price(karkh.id, Some(dec(4500)), None, Some("admin-2"))
            .await
            .unwrap();

        let history = store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].old_price, None);
        assert_eq!(history[0].new_price, Some(dec(4500)));
        assert_eq!(history[0].reason, "Area delivery price overridden to 4500");

        let effective = service.effective_area_price(karkh.id).await.unwrap();
        assert_eq!(effective.price, dec(4500));
        assert_eq!(effective.source, PriceSource::Explicit);
    }

    #[tokio::test]
    async fn test_negative_area_price_is_rejected() {
        let (store, service) = service();
        let baghdad = store.add_governorate("Baghdad", 5000);
        let karkh = store.add_area(baghdad.id, "Karkh", None);
        let calls_before = store.calls();

        let result = service
            .set_area_price(karkh.id, Some(dec(-5)), None, None)
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.calls(), calls_before);
        assert_eq!(store.area(karkh.id).delivery_price, None);
        assert!(store.history().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_area_is_not_found() {
        let (store, service) = service();
        let result = service
            .set_area_price(Uuid::new_v4(), Some(dec(100)), None, None)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(store.history().is_empty());
    }

    #[tokio::test]
    async fn test_reset_after_materialization_then_governorate_change() {
        let (store, service) = service();
        let baghdad = store.add_governorate("Baghdad", 5000);
        let karkh = store.add_area(baghdad.id, "Karkh", None);

        // Karkh receives a materialized copy, then is reset to inherit
        service
            .set_governorate_price(baghdad.id, dec(6000), None, None)
            .await
            .unwrap();
        service
            .set_area_price(karkh.id, None, None, None)
            .await
            .unwrap();
        assert_eq!(store.area(karkh.id).delivery_price, None);

        // The next governorate change materializes it again
        service
            .set_governorate_price(baghdad.id, dec(6500), None, None)
            .await
            .unwrap();
        assert_eq!(store.area(karkh.id).delivery_price, Some(dec(6500)));

        // one row per call
        assert_eq!(store.history().len(), 3);
    }

    #[tokio::test]
    async fn test_list_price_history_filters_and_pages() {
        let (store, service) = service();
        let baghdad = store.add_governorate("Baghdad", 5000);
        let karkh = store.add_area(baghdad.id, "Karkh", Some(1000));

        for price in [5100, 5200, 5300] {
            service
                .set_governorate_price(baghdad.id, dec(price), None, None)
                .await
                .unwrap();
        }
        service
            .set_area_price(karkh.id, Some(dec(1500)), None, None)
            .await
            .unwrap();

        let filter = PriceHistoryFilter {
            entity_type: Some(PriceEntityType::Governorate),
            entity_id: Some(baghdad.id),
        };
        let (page, total) = service.list_price_history(&filter, 0, 2).await.unwrap();

        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);
        // newest first
        assert_eq!(page[0].new_price, Some(dec(5300)));
        assert_eq!(page[1].new_price, Some(dec(5200)));

        let (all, total_all) = service
            .list_price_history(&PriceHistoryFilter::default(), 0, 50)
            .await
            .unwrap();
        assert_eq!(total_all, 4);
        assert_eq!(all[0].entity_type, PriceEntityType::Area);
    }
}
