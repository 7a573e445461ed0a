use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::zones::{dtos as zones_dtos, handlers as zones_handlers, models as zones_models, pricing};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handler::get_me,
        // Zones
        zones_handlers::list_countries,
        zones_handlers::get_country,
        zones_handlers::create_country,
        zones_handlers::update_country,
        zones_handlers::delete_country,
        zones_handlers::list_governorates,
        zones_handlers::get_governorate,
        zones_handlers::create_governorate,
        zones_handlers::update_governorate,
        zones_handlers::delete_governorate,
        zones_handlers::list_areas,
        zones_handlers::get_area,
        zones_handlers::create_area,
        zones_handlers::update_area,
        zones_handlers::delete_area,
        // Pricing
        zones_handlers::set_governorate_price,
        zones_handlers::set_area_price,
        zones_handlers::get_effective_area_price,
        zones_handlers::list_price_history,
    ),
    components(
        schemas(
            Meta,
            // Auth
            auth::dto::MeResponseDto,
            ApiResponse<auth::dto::MeResponseDto>,
            // Zones
            zones_dtos::CountryResponseDto,
            zones_dtos::CreateCountryDto,
            zones_dtos::UpdateCountryDto,
            zones_dtos::GovernorateResponseDto,
            zones_dtos::CreateGovernorateDto,
            zones_dtos::UpdateGovernorateDto,
            zones_dtos::AreaResponseDto,
            zones_dtos::CreateAreaDto,
            zones_dtos::UpdateAreaDto,
            ApiResponse<zones_dtos::CountryResponseDto>,
            ApiResponse<Vec<zones_dtos::CountryResponseDto>>,
            ApiResponse<zones_dtos::GovernorateResponseDto>,
            ApiResponse<Vec<zones_dtos::GovernorateResponseDto>>,
            ApiResponse<zones_dtos::AreaResponseDto>,
            ApiResponse<Vec<zones_dtos::AreaResponseDto>>,
            // Pricing
            pricing::PriceSource,
            zones_models::PriceEntityType,
            zones_dtos::SetGovernoratePriceDto,
            zones_dtos::SetAreaPriceDto,
            zones_dtos::GovernoratePriceUpdateResponseDto,
            zones_dtos::AreaPriceUpdateResponseDto,
            zones_dtos::EffectiveAreaPriceDto,
            zones_dtos::PriceChangeRecordDto,
            ApiResponse<zones_dtos::GovernoratePriceUpdateResponseDto>,
            ApiResponse<zones_dtos::AreaPriceUpdateResponseDto>,
            ApiResponse<zones_dtos::EffectiveAreaPriceDto>,
            ApiResponse<Vec<zones_dtos::PriceChangeRecordDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Current user"),
        (name = "zones", description = "Countries, governorates and areas"),
        (name = "pricing", description = "Delivery prices and their change history"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Delivery Admin API",
        version = "0.1.0",
        description = "Back-office API for delivery zones and pricing",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Overrides the OpenAPI info block from `SWAGGER_*` settings
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
