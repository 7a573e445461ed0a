use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::zones::dtos::*;
use crate::features::zones::services::PricingService;
use crate::features::zones::stores::PriceHistoryFilter;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Set a governorate's delivery price
///
/// Records a price history entry. Depending on `PRICING_CASCADE_MODE` the new
/// price is also copied into every area of the governorate that inherits.
#[utoipa::path(
    put,
    path = "/api/zones/governorates/{id}/delivery-price",
    params(("id" = Uuid, Path, description = "Governorate ID")),
    request_body = SetGovernoratePriceDto,
    responses(
        (status = 200, description = "Price updated", body = ApiResponse<GovernoratePriceUpdateResponseDto>),
        (status = 400, description = "Negative price or invalid reason"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Governorate not found")
    ),
    tag = "pricing",
    security(("bearer_auth" = []))
)]
pub async fn set_governorate_price(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<PricingService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<SetGovernoratePriceDto>,
) -> Result<Json<ApiResponse<GovernoratePriceUpdateResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let update = service
        .set_governorate_price(
            id,
            dto.delivery_price,
            dto.reason.as_deref(),
            Some(&user.account_id),
        )
        .await?;

    Ok(Json(ApiResponse::success(
        Some(GovernoratePriceUpdateResponseDto {
            governorate: update.governorate.into(),
            old_price: update.old_price,
            materialized_areas: update.materialized_areas,
        }),
        Some("Governorate delivery price updated".to_string()),
        None,
    )))
}

/// Override an area's delivery price, or reset it with `deliveryPrice: null`
#[utoipa::path(
    put,
    path = "/api/zones/areas/{id}/delivery-price",
    params(("id" = Uuid, Path, description = "Area ID")),
    request_body = SetAreaPriceDto,
    responses(
        (status = 200, description = "Price updated", body = ApiResponse<AreaPriceUpdateResponseDto>),
        (status = 400, description = "Negative price or invalid reason"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Area not found")
    ),
    tag = "pricing",
    security(("bearer_auth" = []))
)]
pub async fn set_area_price(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<PricingService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<SetAreaPriceDto>,
) -> Result<Json<ApiResponse<AreaPriceUpdateResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let update = service
        .set_area_price(
            id,
            dto.delivery_price,
            dto.reason.as_deref(),
            Some(&user.account_id),
        )
        .await?;

    let effective_price = update.effective_price();
    let area = AreaResponseDto::with_effective_price(update.area, effective_price);

    Ok(Json(ApiResponse::success(
        Some(AreaPriceUpdateResponseDto {
            area,
            old_price: update.old_price,
        }),
        Some("Area delivery price updated".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/zones/areas/{id}/effective-price",
    params(("id" = Uuid, Path, description = "Area ID")),
    responses(
        (status = 200, description = "Price charged for the area", body = ApiResponse<EffectiveAreaPriceDto>),
        (status = 404, description = "Area not found"),
        (status = 500, description = "Stored zone data is inconsistent")
    ),
    tag = "pricing",
    security(("bearer_auth" = []))
)]
pub async fn get_effective_area_price(
    _user: AuthenticatedUser,
    State(service): State<Arc<PricingService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EffectiveAreaPriceDto>>> {
    let price = service.effective_area_price(id).await?;
    Ok(Json(ApiResponse::success(Some(price.into()), None, None)))
}

/// Price change history, newest first (paginated)
#[utoipa::path(
    get,
    path = "/api/zones/price-history",
    params(PaginationQuery, PriceHistoryQuery),
    responses(
        (status = 200, description = "Price changes", body = ApiResponse<Vec<PriceChangeRecordDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "pricing",
    security(("bearer_auth" = []))
)]
pub async fn list_price_history(
    _user: AuthenticatedUser,
    State(service): State<Arc<PricingService>>,
    Query(params): Query<PaginationQuery>,
    Query(filter): Query<PriceHistoryQuery>,
) -> Result<Json<ApiResponse<Vec<PriceChangeRecordDto>>>> {
    let (records, total) = service
        .list_price_history(&PriceHistoryFilter::from(filter), params.offset(), params.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(records.into_iter().map(Into::into).collect()),
        None,
        Some(Meta { total }),
    )))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use uuid::Uuid;

    use crate::core::config::PricingConfig;
    use crate::features::zones::routes::pricing_routes;
    use crate::features::zones::services::PricingService;
    use crate::features::zones::stores::memory::MemoryPricingStore;
    use crate::shared::test_helpers::{with_admin_auth, with_viewer_auth};

    fn server(store: Arc<MemoryPricingStore>, admin: bool) -> TestServer {
        let service = Arc::new(PricingService::new(store, PricingConfig::default()));
        let router = pricing_routes(service);
        let router = if admin {
            with_admin_auth(router)
        } else {
            with_viewer_auth(router)
        };
        TestServer::new(router).unwrap()
    }

    fn money(value: &Value) -> Decimal {
        serde_json::from_value(value.clone()).unwrap()
    }

    #[tokio::test]
    async fn test_set_governorate_price_cascades_and_audits() {
        let store = Arc::new(MemoryPricingStore::new());
        let baghdad = store.add_governorate("Baghdad", 5000);
        let karkh = store.add_area(baghdad.id, "Karkh", None);
        let server = server(store.clone(), true);

        let response = server
            .put(&format!("/api/zones/governorates/{}/delivery-price", baghdad.id))
            .json(&json!({ "deliveryPrice": 6000, "reason": "price hike" }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(money(&body["data"]["oldPrice"]), Decimal::from(5000));
        assert_eq!(
            money(&body["data"]["governorate"]["deliveryPrice"]),
            Decimal::from(6000)
        );
        assert_eq!(body["data"]["materializedAreas"], 1);

        assert_eq!(store.area(karkh.id).delivery_price, Some(Decimal::from(6000)));
        let history = store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].changed_by.as_deref(), Some("test-admin-id"));
    }

    #[tokio::test]
    async fn test_negative_governorate_price_returns_400() {
        let store = Arc::new(MemoryPricingStore::new());
        let baghdad = store.add_governorate("Baghdad", 5000);
        let server = server(store.clone(), true);

        let response = server
            .put(&format!("/api/zones/governorates/{}/delivery-price", baghdad.id))
            .json(&json!({ "deliveryPrice": -10, "reason": "bad" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(store.history().is_empty());
        assert_eq!(
            store.governorate(baghdad.id).delivery_price,
            Decimal::from(5000)
        );
    }

    #[tokio::test]
    async fn test_non_admin_cannot_change_prices() {
        let store = Arc::new(MemoryPricingStore::new());
        let baghdad = store.add_governorate("Baghdad", 5000);
        let rusafa = store.add_area(baghdad.id, "Rusafa", Some(7000));
        let server = server(store.clone(), false);

        server
            .put(&format!("/api/zones/governorates/{}/delivery-price", baghdad.id))
            .json(&json!({ "deliveryPrice": 6000 }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server
            .put(&format!("/api/zones/areas/{}/delivery-price", rusafa.id))
            .json(&json!({ "deliveryPrice": null }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        assert!(store.history().is_empty());

        // reads stay open to any authenticated user
        server
            .get(&format!("/api/zones/areas/{}/effective-price", rusafa.id))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_reset_area_price_with_null() {
        let store = Arc::new(MemoryPricingStore::new());
        let baghdad = store.add_governorate("Baghdad", 5000);
        let rusafa = store.add_area(baghdad.id, "Rusafa", Some(3000));
        let server = server(store.clone(), true);

        let response = server
            .put(&format!("/api/zones/areas/{}/delivery-price", rusafa.id))
            .json(&json!({ "deliveryPrice": null, "reason": "reset" }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(money(&body["data"]["oldPrice"]), Decimal::from(3000));
        assert!(body["data"]["area"]["deliveryPrice"].is_null());
        assert_eq!(
            money(&body["data"]["area"]["effectivePrice"]),
            Decimal::from(5000)
        );
        assert_eq!(body["data"]["area"]["priceSource"], "inherited");
    }

    #[tokio::test]
    async fn test_area_override_succeeds_when_parent_price_is_corrupt() {
        let store = Arc::new(MemoryPricingStore::new());
        let baghdad = store.add_governorate("Baghdad", 5000);
        let karkh = store.add_area(baghdad.id, "Karkh", None);
        store.force_governorate_price(baghdad.id, Decimal::from(-1));
        let server = server(store.clone(), true);

        let response = server
            .put(&format!("/api/zones/areas/{}/delivery-price", karkh.id))
            .json(&json!({ "deliveryPrice": 3000 }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(
            money(&body["data"]["area"]["effectivePrice"]),
            Decimal::from(3000)
        );
        assert_eq!(body["data"]["area"]["priceSource"], "explicit");
        assert_eq!(store.history().len(), 1);
    }

    #[tokio::test]
    async fn test_effective_price_endpoint() {
        let store = Arc::new(MemoryPricingStore::new());
        let baghdad = store.add_governorate("Baghdad", 5000);
        let karkh = store.add_area(baghdad.id, "Karkh", None);
        let server = server(store, true);

        let response = server
            .get(&format!("/api/zones/areas/{}/effective-price", karkh.id))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(money(&body["data"]["price"]), Decimal::from(5000));
        assert_eq!(body["data"]["source"], "inherited");

        server
            .get(&format!("/api/zones/areas/{}/effective-price", Uuid::new_v4()))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_price_history_is_filtered_and_counted() {
        let store = Arc::new(MemoryPricingStore::new());
        let baghdad = store.add_governorate("Baghdad", 5000);
        let karkh = store.add_area(baghdad.id, "Karkh", Some(1000));
        let server = server(store, true);

        for price in [5100, 5200] {
            server
                .put(&format!("/api/zones/governorates/{}/delivery-price", baghdad.id))
                .json(&json!({ "deliveryPrice": price }))
                .await
                .assert_status_ok();
        }
        server
            .put(&format!("/api/zones/areas/{}/delivery-price", karkh.id))
            .json(&json!({ "deliveryPrice": 1500 }))
            .await
            .assert_status_ok();

        let response = server
            .get("/api/zones/price-history")
            .add_query_param("entityType", "governorate")
            .add_query_param("page_size", 1)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 2);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["data"][0]["entityType"], "governorate");
        assert_eq!(
            body["data"][0]["reason"],
            "Governorate delivery price updated"
        );
    }
}
