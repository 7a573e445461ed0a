use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::zones::handlers;
use crate::features::zones::services::{PricingService, ZoneService};

/// Routes for the zones feature (require JWT authentication)
pub fn routes(zone_service: Arc<ZoneService>, pricing_service: Arc<PricingService>) -> Router {
    zone_routes(zone_service).merge(pricing_routes(pricing_service))
}

/// Country / governorate / area management
pub fn zone_routes(service: Arc<ZoneService>) -> Router {
    Router::new()
        .route(
            "/api/zones/countries",
            get(handlers::list_countries).post(handlers::create_country),
        )
        .route(
            "/api/zones/countries/{id}",
            get(handlers::get_country)
                .patch(handlers::update_country)
                .delete(handlers::delete_country),
        )
        .route(
            "/api/zones/countries/{id}/governorates",
            get(handlers::list_governorates).post(handlers::create_governorate),
        )
        .route(
            "/api/zones/governorates/{id}",
            get(handlers::get_governorate)
                .patch(handlers::update_governorate)
                .delete(handlers::delete_governorate),
        )
        .route(
            "/api/zones/governorates/{id}/areas",
            get(handlers::list_areas).post(handlers::create_area),
        )
        .route(
            "/api/zones/areas/{id}",
            get(handlers::get_area)
                .patch(handlers::update_area)
                .delete(handlers::delete_area),
        )
        .with_state(service)
}

/// Delivery price changes, resolution and history
pub fn pricing_routes(service: Arc<PricingService>) -> Router {
    Router::new()
        .route(
            "/api/zones/governorates/{id}/delivery-price",
            put(handlers::set_governorate_price),
        )
        .route(
            "/api/zones/areas/{id}/delivery-price",
            put(handlers::set_area_price),
        )
        .route(
            "/api/zones/areas/{id}/effective-price",
            get(handlers::get_effective_area_price),
        )
        .route("/api/zones/price-history", get(handlers::list_price_history))
        .with_state(service)
}
