use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::zones::dtos::*;
use crate::features::zones::services::ZoneService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

// =============================================================================
// COUNTRIES
// =============================================================================

/// List countries (paginated)
#[utoipa::path(
    get,
    path = "/api/zones/countries",
    params(PaginationQuery, ZoneListQuery),
    responses(
        (status = 200, description = "List of countries", body = ApiResponse<Vec<CountryResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "zones",
    security(("bearer_auth" = []))
)]
pub async fn list_countries(
    _user: AuthenticatedUser,
    State(service): State<Arc<ZoneService>>,
    Query(params): Query<PaginationQuery>,
    Query(filter): Query<ZoneListQuery>,
) -> Result<Json<ApiResponse<Vec<CountryResponseDto>>>> {
    let (items, total) = service
        .list_countries(&filter, params.offset(), params.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/zones/countries/{id}",
    params(("id" = Uuid, Path, description = "Country ID")),
    responses(
        (status = 200, description = "Country found", body = ApiResponse<CountryResponseDto>),
        (status = 404, description = "Country not found")
    ),
    tag = "zones",
    security(("bearer_auth" = []))
)]
pub async fn get_country(
    _user: AuthenticatedUser,
    State(service): State<Arc<ZoneService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CountryResponseDto>>> {
    let country = service.get_country(id).await?;
    Ok(Json(ApiResponse::success(Some(country), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/zones/countries",
    request_body = CreateCountryDto,
    responses(
        (status = 201, description = "Country created", body = ApiResponse<CountryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 409, description = "Country code already exists")
    ),
    tag = "zones",
    security(("bearer_auth" = []))
)]
pub async fn create_country(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ZoneService>>,
    AppJson(dto): AppJson<CreateCountryDto>,
) -> Result<(StatusCode, Json<ApiResponse<CountryResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let country = service.create_country(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(country),
            Some("Country created".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/zones/countries/{id}",
    params(("id" = Uuid, Path, description = "Country ID")),
    request_body = UpdateCountryDto,
    responses(
        (status = 200, description = "Country updated", body = ApiResponse<CountryResponseDto>),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Country not found")
    ),
    tag = "zones",
    security(("bearer_auth" = []))
)]
pub async fn update_country(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ZoneService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateCountryDto>,
) -> Result<Json<ApiResponse<CountryResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let country = service.update_country(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(country), None, None)))
}

/// Delete a country together with its governorates and areas
#[utoipa::path(
    delete,
    path = "/api/zones/countries/{id}",
    params(("id" = Uuid, Path, description = "Country ID")),
    responses(
        (status = 200, description = "Country deleted"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Country not found")
    ),
    tag = "zones",
    security(("bearer_auth" = []))
)]
pub async fn delete_country(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ZoneService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_country(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Country deleted".to_string()),
        None,
    )))
}

// =============================================================================
// GOVERNORATES
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/zones/countries/{id}/governorates",
    params(
        ("id" = Uuid, Path, description = "Country ID"),
        PaginationQuery,
        ZoneListQuery
    ),
    responses(
        (status = 200, description = "Governorates of the country", body = ApiResponse<Vec<GovernorateResponseDto>>),
        (status = 404, description = "Country not found")
    ),
    tag = "zones",
    security(("bearer_auth" = []))
)]
pub async fn list_governorates(
    _user: AuthenticatedUser,
    State(service): State<Arc<ZoneService>>,
    Path(country_id): Path<Uuid>,
    Query(params): Query<PaginationQuery>,
    Query(filter): Query<ZoneListQuery>,
) -> Result<Json<ApiResponse<Vec<GovernorateResponseDto>>>> {
    let (items, total) = service
        .list_governorates(country_id, &filter, params.offset(), params.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/zones/governorates/{id}",
    params(("id" = Uuid, Path, description = "Governorate ID")),
    responses(
        (status = 200, description = "Governorate found", body = ApiResponse<GovernorateResponseDto>),
        (status = 404, description = "Governorate not found")
    ),
    tag = "zones",
    security(("bearer_auth" = []))
)]
pub async fn get_governorate(
    _user: AuthenticatedUser,
    State(service): State<Arc<ZoneService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<GovernorateResponseDto>>> {
    let governorate = service.get_governorate(id).await?;
    Ok(Json(ApiResponse::success(Some(governorate), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/zones/countries/{id}/governorates",
    params(("id" = Uuid, Path, description = "Country ID")),
    request_body = CreateGovernorateDto,
    responses(
        (status = 201, description = "Governorate created", body = ApiResponse<GovernorateResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Country not found")
    ),
    tag = "zones",
    security(("bearer_auth" = []))
)]
pub async fn create_governorate(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ZoneService>>,
    Path(country_id): Path<Uuid>,
    AppJson(dto): AppJson<CreateGovernorateDto>,
) -> Result<(StatusCode, Json<ApiResponse<GovernorateResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let governorate = service.create_governorate(country_id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(governorate),
            Some("Governorate created".to_string()),
            None,
        )),
    ))
}

/// Update names or status. The delivery price has its own endpoint.
#[utoipa::path(
    patch,
    path = "/api/zones/governorates/{id}",
    params(("id" = Uuid, Path, description = "Governorate ID")),
    request_body = UpdateGovernorateDto,
    responses(
        (status = 200, description = "Governorate updated", body = ApiResponse<GovernorateResponseDto>),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Governorate not found")
    ),
    tag = "zones",
    security(("bearer_auth" = []))
)]
pub async fn update_governorate(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ZoneService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateGovernorateDto>,
) -> Result<Json<ApiResponse<GovernorateResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let governorate = service.update_governorate(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(governorate), None, None)))
}

#[utoipa::path(
    delete,
    path = "/api/zones/governorates/{id}",
    params(("id" = Uuid, Path, description = "Governorate ID")),
    responses(
        (status = 200, description = "Governorate deleted"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Governorate not found")
    ),
    tag = "zones",
    security(("bearer_auth" = []))
)]
pub async fn delete_governorate(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ZoneService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_governorate(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Governorate deleted".to_string()),
        None,
    )))
}

// =============================================================================
// AREAS
// =============================================================================

/// List areas of a governorate with their effective prices
#[utoipa::path(
    get,
    path = "/api/zones/governorates/{id}/areas",
    params(
        ("id" = Uuid, Path, description = "Governorate ID"),
        PaginationQuery,
        ZoneListQuery
    ),
    responses(
        (status = 200, description = "Areas of the governorate", body = ApiResponse<Vec<AreaResponseDto>>),
        (status = 404, description = "Governorate not found")
    ),
    tag = "zones",
    security(("bearer_auth" = []))
)]
pub async fn list_areas(
    _user: AuthenticatedUser,
    State(service): State<Arc<ZoneService>>,
    Path(governorate_id): Path<Uuid>,
    Query(params): Query<PaginationQuery>,
    Query(filter): Query<ZoneListQuery>,
) -> Result<Json<ApiResponse<Vec<AreaResponseDto>>>> {
    let (items, total) = service
        .list_areas(governorate_id, &filter, params.offset(), params.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/zones/areas/{id}",
    params(("id" = Uuid, Path, description = "Area ID")),
    responses(
        (status = 200, description = "Area found", body = ApiResponse<AreaResponseDto>),
        (status = 404, description = "Area not found")
    ),
    tag = "zones",
    security(("bearer_auth" = []))
)]
pub async fn get_area(
    _user: AuthenticatedUser,
    State(service): State<Arc<ZoneService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AreaResponseDto>>> {
    let area = service.get_area(id).await?;
    Ok(Json(ApiResponse::success(Some(area), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/zones/governorates/{id}/areas",
    params(("id" = Uuid, Path, description = "Governorate ID")),
    request_body = CreateAreaDto,
    responses(
        (status = 201, description = "Area created", body = ApiResponse<AreaResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Governorate not found")
    ),
    tag = "zones",
    security(("bearer_auth" = []))
)]
pub async fn create_area(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ZoneService>>,
    Path(governorate_id): Path<Uuid>,
    AppJson(dto): AppJson<CreateAreaDto>,
) -> Result<(StatusCode, Json<ApiResponse<AreaResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let area = service.create_area(governorate_id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(area),
            Some("Area created".to_string()),
            None,
        )),
    ))
}

/// Update names or status. The delivery price has its own endpoint.
#[utoipa::path(
    patch,
    path = "/api/zones/areas/{id}",
    params(("id" = Uuid, Path, description = "Area ID")),
    request_body = UpdateAreaDto,
    responses(
        (status = 200, description = "Area updated", body = ApiResponse<AreaResponseDto>),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Area not found")
    ),
    tag = "zones",
    security(("bearer_auth" = []))
)]
pub async fn update_area(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ZoneService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateAreaDto>,
) -> Result<Json<ApiResponse<AreaResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let area = service.update_area(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(area), None, None)))
}

#[utoipa::path(
    delete,
    path = "/api/zones/areas/{id}",
    params(("id" = Uuid, Path, description = "Area ID")),
    responses(
        (status = 200, description = "Area deleted"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Area not found")
    ),
    tag = "zones",
    security(("bearer_auth" = []))
)]
pub async fn delete_area(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ZoneService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_area(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Area deleted".to_string()),
        None,
    )))
}
