use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::zones::dtos::{
    AreaResponseDto, CountryResponseDto, CreateAreaDto, CreateCountryDto, CreateGovernorateDto,
    GovernorateResponseDto, UpdateAreaDto, UpdateCountryDto, UpdateGovernorateDto, ZoneListQuery,
};
use crate::features::zones::models::{Area, Country, Governorate};
use crate::features::zones::pricing;

/// `WHERE` fragment shared by the list queries.
/// `$1` is the parent id (ignored for countries), `$2` the search text, `$3` the active flag.
const ZONE_FILTER: &str = r#"
    ($2::text IS NULL OR name_en ILIKE '%' || $2 || '%' OR name_ar ILIKE '%' || $2 || '%')
    AND ($3::boolean IS NULL OR is_active = $3)
"#;

/// Service for country / governorate / area management.
///
/// Prices are only written here on creation; later changes go through
/// [`crate::features::zones::services::PricingService`] so they are audited.
pub struct ZoneService {
    pool: PgPool,
}

impl ZoneService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // COUNTRIES
    // =========================================================================

    pub async fn list_countries(
        &self,
        query: &ZoneListQuery,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<CountryResponseDto>, i64)> {
        let search = normalize_search(query.search.as_deref());
        let filter = r#"
            WHERE ($1::text IS NULL
                   OR name_en ILIKE '%' || $1 || '%'
                   OR name_ar ILIKE '%' || $1 || '%'
                   OR code = UPPER($1))
              AND ($2::boolean IS NULL OR is_active = $2)
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM countries {}", filter))
            .bind(search.as_deref())
            .bind(query.active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count countries: {:?}", e);
                AppError::Database(e)
            })?;

        let sql = format!(
            "SELECT {} FROM countries {} ORDER BY name_en OFFSET $3 LIMIT $4",
            Country::COLUMNS,
            filter
        );
        let countries = sqlx::query_as::<_, Country>(&sql)
            .bind(search.as_deref())
            .bind(query.active)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list countries: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((countries.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get_country(&self, id: Uuid) -> Result<CountryResponseDto> {
        self.find_country(id).await.map(Into::into)
    }

    pub async fn create_country(&self, dto: CreateCountryDto) -> Result<CountryResponseDto> {
        let sql = format!(
            r#"
            INSERT INTO countries (code, name_en, name_ar, currency_code, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            Country::COLUMNS
        );
        let country = sqlx::query_as::<_, Country>(&sql)
            .bind(&dto.code)
            .bind(dto.name_en.trim())
            .bind(dto.name_ar.trim())
            .bind(&dto.currency_code)
            .bind(dto.is_active.unwrap_or(true))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create country {}: {:?}", dto.code, e);
                AppError::from_db(e, &format!("Country code '{}' already exists", dto.code))
            })?;

        tracing::info!(country_id = %country.id, code = %country.code, "Country created");
        Ok(country.into())
    }

    pub async fn update_country(&self, id: Uuid, dto: UpdateCountryDto) -> Result<CountryResponseDto> {
        let sql = format!(
            r#"
            UPDATE countries
            SET name_en = COALESCE($2, name_en),
                name_ar = COALESCE($3, name_ar),
                currency_code = COALESCE($4, currency_code),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            Country::COLUMNS
        );
        sqlx::query_as::<_, Country>(&sql)
            .bind(id)
            .bind(dto.name_en.as_deref().map(str::trim))
            .bind(dto.name_ar.as_deref().map(str::trim))
            .bind(dto.currency_code.as_deref())
            .bind(dto.is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update country {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Country '{}' not found", id)))
    }

    /// Deletes the country with its governorates and areas; price history is kept
    pub async fn delete_country(&self, id: Uuid) -> Result<()> {
        self.delete_row("countries", "Country", id).await
    }

    // =========================================================================
    // GOVERNORATES
    // =========================================================================

    pub async fn list_governorates(
        &self,
        country_id: Uuid,
        query: &ZoneListQuery,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<GovernorateResponseDto>, i64)> {
        self.find_country(country_id).await?;
        let search = normalize_search(query.search.as_deref());

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM governorates WHERE country_id = $1 AND {}",
            ZONE_FILTER
        ))
        .bind(country_id)
        .bind(search.as_deref())
        .bind(query.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count governorates of {}: {:?}", country_id, e);
            AppError::Database(e)
        })?;

        let sql = format!(
            "SELECT {} FROM governorates WHERE country_id = $1 AND {} ORDER BY name_en OFFSET $4 LIMIT $5",
            Governorate::COLUMNS,
            ZONE_FILTER
        );
        let governorates = sqlx::query_as::<_, Governorate>(&sql)
            .bind(country_id)
            .bind(search.as_deref())
            .bind(query.active)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list governorates of {}: {:?}", country_id, e);
                AppError::Database(e)
            })?;

        Ok((governorates.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get_governorate(&self, id: Uuid) -> Result<GovernorateResponseDto> {
        self.find_governorate(id).await.map(Into::into)
    }

    /// Creation sets the initial price without a history row
    pub async fn create_governorate(
        &self,
        country_id: Uuid,
        dto: CreateGovernorateDto,
    ) -> Result<GovernorateResponseDto> {
        let price = pricing::validate_price(dto.delivery_price)?;
        self.find_country(country_id).await?;

        let sql = format!(
            r#"
            INSERT INTO governorates (country_id, name_en, name_ar, delivery_price, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            Governorate::COLUMNS
        );
        let governorate = sqlx::query_as::<_, Governorate>(&sql)
            .bind(country_id)
            .bind(dto.name_en.trim())
            .bind(dto.name_ar.trim())
            .bind(price)
            .bind(dto.is_active.unwrap_or(true))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create governorate in {}: {:?}", country_id, e);
                AppError::from_db(e, &format!("Country '{}' not found", country_id))
            })?;

        tracing::info!(
            governorate_id = %governorate.id,
            delivery_price = %governorate.delivery_price,
            "Governorate created"
        );
        Ok(governorate.into())
    }

    pub async fn update_governorate(
        &self,
        id: Uuid,
        dto: UpdateGovernorateDto,
    ) -> Result<GovernorateResponseDto> {
        let sql = format!(
            r#"
            UPDATE governorates
            SET name_en = COALESCE($2, name_en),
                name_ar = COALESCE($3, name_ar),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            Governorate::COLUMNS
        );
        sqlx::query_as::<_, Governorate>(&sql)
            .bind(id)
            .bind(dto.name_en.as_deref().map(str::trim))
            .bind(dto.name_ar.as_deref().map(str::trim))
            .bind(dto.is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update governorate {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Governorate '{}' not found", id)))
    }

    pub async fn delete_governorate(&self, id: Uuid) -> Result<()> {
        self.delete_row("governorates", "Governorate", id).await
    }

    // =========================================================================
    // AREAS
    // =========================================================================

    /// Areas of a governorate, each with its effective price
    pub async fn list_areas(
        &self,
        governorate_id: Uuid,
        query: &ZoneListQuery,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<AreaResponseDto>, i64)> {
        let governorate = self.find_governorate(governorate_id).await?;
        let search = normalize_search(query.search.as_deref());

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM areas WHERE governorate_id = $1 AND {}",
            ZONE_FILTER
        ))
        .bind(governorate_id)
        .bind(search.as_deref())
        .bind(query.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count areas of {}: {:?}", governorate_id, e);
            AppError::Database(e)
        })?;

        let sql = format!(
            "SELECT {} FROM areas WHERE governorate_id = $1 AND {} ORDER BY name_en OFFSET $4 LIMIT $5",
            Area::COLUMNS,
            ZONE_FILTER
        );
        let areas = sqlx::query_as::<_, Area>(&sql)
            .bind(governorate_id)
            .bind(search.as_deref())
            .bind(query.active)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list areas of {}: {:?}", governorate_id, e);
                AppError::Database(e)
            })?;

        Ok((
            areas
                .into_iter()
                .map(|a| AreaResponseDto::new(a, &governorate))
                .collect(),
            total,
        ))
    }

    pub async fn get_area(&self, id: Uuid) -> Result<AreaResponseDto> {
        let area = self.find_area(id).await?;
        let governorate = self.parent_of(&area).await?;
        Ok(AreaResponseDto::new(area, &governorate))
    }

    /// Creation may set an initial override without a history row
    pub async fn create_area(&self, governorate_id: Uuid, dto: CreateAreaDto) -> Result<AreaResponseDto> {
        let price = dto.delivery_price.map(pricing::validate_price).transpose()?;
        let governorate = self.find_governorate(governorate_id).await?;

        let sql = format!(
            r#"
            INSERT INTO areas (governorate_id, name_en, name_ar, delivery_price, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            Area::COLUMNS
        );
        let area = sqlx::query_as::<_, Area>(&sql)
            .bind(governorate_id)
            .bind(dto.name_en.trim())
            .bind(dto.name_ar.trim())
            .bind(price)
            .bind(dto.is_active.unwrap_or(true))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create area in {}: {:?}", governorate_id, e);
                AppError::from_db(e, &format!("Governorate '{}' not found", governorate_id))
            })?;

        tracing::info!(area_id = %area.id, delivery_price = ?area.delivery_price, "Area created");
        Ok(AreaResponseDto::new(area, &governorate))
    }

    pub async fn update_area(&self, id: Uuid, dto: UpdateAreaDto) -> Result<AreaResponseDto> {
        let sql = format!(
            r#"
            UPDATE areas
            SET name_en = COALESCE($2, name_en),
                name_ar = COALESCE($3, name_ar),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            Area::COLUMNS
        );
        let area = sqlx::query_as::<_, Area>(&sql)
            .bind(id)
            .bind(dto.name_en.as_deref().map(str::trim))
            .bind(dto.name_ar.as_deref().map(str::trim))
            .bind(dto.is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update area {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Area '{}' not found", id)))?;

        let governorate = self.parent_of(&area).await?;
        Ok(AreaResponseDto::new(area, &governorate))
    }

    pub async fn delete_area(&self, id: Uuid) -> Result<()> {
        self.delete_row("areas", "Area", id).await
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    async fn find_country(&self, id: Uuid) -> Result<Country> {
        let sql = format!("SELECT {} FROM countries WHERE id = $1", Country::COLUMNS);
        sqlx::query_as::<_, Country>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch country {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Country '{}' not found", id)))
    }

    async fn find_governorate(&self, id: Uuid) -> Result<Governorate> {
        let sql = format!("SELECT {} FROM governorates WHERE id = $1", Governorate::COLUMNS);
        sqlx::query_as::<_, Governorate>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch governorate {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Governorate '{}' not found", id)))
    }

    async fn find_area(&self, id: Uuid) -> Result<Area> {
        let sql = format!("SELECT {} FROM areas WHERE id = $1", Area::COLUMNS);
        sqlx::query_as::<_, Area>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch area {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Area '{}' not found", id)))
    }

    /// Parent governorate of an existing area; a missing parent is corrupt data
    async fn parent_of(&self, area: &Area) -> Result<Governorate> {
        match self.find_governorate(area.governorate_id).await {
            Err(AppError::NotFound(_)) => Err(AppError::DataIntegrity(format!(
                "Area '{}' references missing governorate '{}'",
                area.id, area.governorate_id
            ))),
            other => other,
        }
    }

    /// `table` is always one of our own table names, never user input
    async fn delete_row(&self, table: &str, label: &str, id: Uuid) -> Result<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", table))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete {} {}: {:?}", label, id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} '{}' not found", label, id)));
        }

        tracing::info!(id = %id, "{} deleted", label);
        Ok(())
    }
}

/// Blank search text means "no filter". `%` and `_` match literally.
fn normalize_search(search: Option<&str>) -> Option<String> {
    let search = search.map(str::trim).filter(|s| !s.is_empty())?;
    let mut escaped = String::with_capacity(search.len());
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Some(escaped)
}
